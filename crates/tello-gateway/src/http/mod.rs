pub mod applications;
pub mod cron;
pub mod greetings;
pub mod health;
pub mod reservations;
pub mod schedule;

use axum::{body::Bytes, http::StatusCode, Json};
use serde_json::{json, Value};
use tello_mail::{send_once, Email, MailError, Mailer, SendOutcome};
use tracing::{error, warn};

/// Error half of every handler's `Result`.
pub type ApiError = (StatusCode, Json<Value>);

/// Parse a request body as a JSON object.
pub fn parse_object(body: &Bytes) -> Result<serde_json::Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(bad_request("Invalid JSON data")),
        Err(e) => {
            warn!(error = %e, "invalid JSON body");
            Err(bad_request("Invalid JSON data"))
        }
    }
}

/// Required keys that are absent, `null` or blank strings, in `required` order.
///
/// `false` and `0` count as present.
pub fn missing_fields(body: &serde_json::Map<String, Value>, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|key| match body.get(**key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        })
        .map(|key| key.to_string())
        .collect()
}

/// 400 with the list of missing fields, or `Ok` when nothing is missing.
pub fn require(body: &serde_json::Map<String, Value>, required: &[&str]) -> Result<(), ApiError> {
    let missing = missing_fields(body, required);
    if missing.is_empty() {
        return Ok(());
    }
    Err((
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": format!("Missing required fields: {}", missing.join(", ")),
            "missing_fields": missing,
        })),
    ))
}

/// A scalar field as display text: strings as-is, numbers and booleans
/// through their JSON form, anything else empty.
pub fn text_field(body: &serde_json::Map<String, Value>, key: &str) -> String {
    match body.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

pub fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message})))
}

pub fn internal_error(context: &str, err: impl std::fmt::Display) -> ApiError {
    error!(error = %err, "{context} failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Internal server error", "details": err.to_string()})),
    )
}

/// Send a freshly composed message over its own connection. A message that
/// failed to render counts as not sent.
pub async fn send_composed(mailer: &dyn Mailer, email: Result<Email, MailError>) -> SendOutcome {
    match email {
        Ok(email) => send_once(mailer, &email).await,
        Err(e) => {
            warn!(mailer = mailer.name(), error = %e, "could not compose email");
            SendOutcome::failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_null_count_as_missing() {
        let body = json!({
            "name": "Leo",
            "email": "   ",
            "age": null,
            "arbitro": false,
            "precio": 0,
        });
        let body = body.as_object().unwrap();
        let missing = missing_fields(body, &["name", "email", "age", "team", "arbitro", "precio"]);
        assert_eq!(missing, vec!["email", "age", "team"]);
    }

    #[test]
    fn text_field_accepts_numbers() {
        let body = json!({"age": 17, "name": " Leo ", "list": [1]});
        let body = body.as_object().unwrap();
        assert_eq!(text_field(body, "age"), "17");
        assert_eq!(text_field(body, "name"), "Leo");
        assert_eq!(text_field(body, "list"), "");
        assert_eq!(text_field(body, "nope"), "");
    }
}
