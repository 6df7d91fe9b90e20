//! rulegate decision service.
//!
//! - Loads rules and operation bindings from `RULEGATE_CONFIG` (strict YAML)
//! - Composes and seals the rule engine
//! - Serves `/v1/authorize`, `/v1/rules`, `/healthz`, `/metrics`

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use rulegate_core::error::{Result, RulegateError};
use rulegate_engine::{app_state, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "rulegate stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = config::config_path();
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.server.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "rulegate starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| RulegateError::Internal(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| RulegateError::Internal(format!("server failed: {e}")))
}
