//! Shared-secret check for the scheduled-job endpoints.
//!
//! The cron runner sends `Authorization: Bearer <cron.secret>`. An empty
//! configured secret disables the check (local development).

use axum::{
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::app::AppState;
use crate::http::ApiError;

pub fn check_cron_secret(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = state.config.cron.secret.as_str();
    if expected.is_empty() {
        return Ok(());
    }
    match extract_bearer(headers) {
        Some(token) if token == expected => Ok(()),
        Some(_) => Err(unauthorized("bearer token mismatch")),
        None => Err(unauthorized("missing bearer token")),
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

fn unauthorized(reason: &str) -> ApiError {
    warn!(reason = %reason, "cron authentication failed");
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"})))
}
