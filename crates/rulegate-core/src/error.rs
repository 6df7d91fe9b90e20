//! Shared error types across rulegate crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// Caller handed the engine a context that breaks its contract.
    InvalidContext,
    /// No authenticated identity.
    Unauthenticated,
    /// Denied by policy.
    Forbidden,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::InvalidContext => "INVALID_CONTEXT",
            ClientCode::Unauthenticated => "UNAUTHENTICATED",
            ClientCode::Forbidden => "FORBIDDEN",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RulegateError>;

/// Unified error type used by core and engine.
#[derive(Debug, Error)]
pub enum RulegateError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid context: {0}")]
    InvalidContext(String),
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl RulegateError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            RulegateError::BadRequest(_) => ClientCode::BadRequest,
            RulegateError::InvalidContext(_) => ClientCode::InvalidContext,
            RulegateError::Unauthenticated => ClientCode::Unauthenticated,
            RulegateError::Forbidden(_) => ClientCode::Forbidden,
            RulegateError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            RulegateError::Internal(_) => ClientCode::Internal,
        }
    }
}

/// Failure raised by a rule while evaluating a context.
///
/// The engine never lets this escape a batch: it is recorded as a failing
/// result tagged `RULE_VALIDATION_ERROR`, carrying the `Display` text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    /// The context lacks data this rule needs (missing param, identity, ...).
    #[error("malformed context: {0}")]
    InvalidContext(String),
    /// An injected dependency (store, directory, ...) failed.
    #[error("lookup failed: {0}")]
    Lookup(String),
    #[error("{0}")]
    Internal(String),
}
