//! Engine config loader (strict parsing).

pub mod schema;

use std::fs;

use rulegate_core::error::{Result, RulegateError};

pub use schema::{BindingConfig, EngineSection, RuleSpec, RulegateConfig, ServerSection};

/// Env var naming the config file; falls back to [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "RULEGATE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "rulegate.yaml";

pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub fn load_from_file(path: &str) -> Result<RulegateConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| RulegateError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<RulegateConfig> {
    let cfg: RulegateConfig = serde_yaml::from_str(s)
        .map_err(|e| RulegateError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
