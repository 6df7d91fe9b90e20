//! Decision endpoints.
//!
//! - `POST /v1/authorize`       : enforce a bound operation (allow / 401 / 403)
//! - `POST /v1/rules/evaluate`  : raw ordered per-rule results
//! - `GET  /v1/rules`           : registered rule names, in registration order

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use rulegate_core::error::{ClientCode, RulegateError};
use rulegate_core::{Params, RuleContext, RuleValidationResult, UserIdentity};

use crate::app_state::AppState;
use crate::enforce::{AccessDecision, AccessRequest};

/// Error body: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug)]
pub struct ApiError(pub RulegateError);

impl From<RulegateError> for ApiError {
    fn from(e: RulegateError) -> Self {
        Self(e)
    }
}

/// Body extraction failures (bad JSON, missing or unknown fields, wrong
/// content type) answer with the same error body as every other 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(RulegateError::BadRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = match code {
            ClientCode::BadRequest | ClientCode::InvalidContext | ClientCode::UnsupportedVersion => {
                StatusCode::BAD_REQUEST
            }
            ClientCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ClientCode::Forbidden => StatusCode::FORBIDDEN,
            ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({ "error": { "code": code.as_str(), "message": self.0.to_string() } });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuthorizeBody {
    pub operation: String,
    #[serde(default)]
    pub user: Option<UserIdentity>,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub params: Option<Params>,
    #[serde(default)]
    pub body: Option<Value>,
}

impl AuthorizeBody {
    fn split(self) -> (String, AccessRequest) {
        let req = AccessRequest {
            user: self.user,
            resource: self.resource,
            key: self.key,
            params: self.params,
            body: self.body,
        };
        (self.operation, req)
    }
}

#[derive(Debug, Serialize)]
struct DecisionBody {
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<String>,
}

fn decision_response(decision: AccessDecision) -> Response {
    let (status, body) = match decision {
        AccessDecision::Allow => (
            StatusCode::OK,
            DecisionBody { allowed: true, code: None, message: None, rule: None },
        ),
        AccessDecision::Unauthenticated => (
            StatusCode::UNAUTHORIZED,
            DecisionBody {
                allowed: false,
                code: Some(ClientCode::Unauthenticated.as_str().to_string()),
                message: Some("authentication required".to_string()),
                rule: None,
            },
        ),
        AccessDecision::Deny(reason) => (
            StatusCode::FORBIDDEN,
            DecisionBody {
                allowed: false,
                code: Some(reason.code),
                message: Some(reason.message),
                rule: reason.rule,
            },
        ),
    };
    (status, Json(body)).into_response()
}

pub async fn authorize(
    State(app): State<AppState>,
    payload: Result<Json<AuthorizeBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload?;
    let (operation, req) = body.split();
    if operation.trim().is_empty() {
        return Err(RulegateError::BadRequest("operation must not be empty".into()).into());
    }
    let decision = app.enforcer().authorize(&operation, req).await?;
    Ok(decision_response(decision))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluateBody {
    pub context: RuleContext,
    /// Omitted: every registered rule.
    #[serde(default)]
    pub rules: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub results: Vec<RuleValidationResult>,
}

pub async fn evaluate(
    State(app): State<AppState>,
    payload: Result<Json<EvaluateBody>, JsonRejection>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let Json(body) = payload?;
    let engine = app.engine();
    let results = engine
        .validate_rules(&body.context, body.rules.as_deref())
        .await?;
    Ok(Json(EvaluateResponse { results }))
}

pub async fn list_rules(State(app): State<AppState>) -> Json<Value> {
    Json(json!({ "rules": app.engine().registered_rules() }))
}
