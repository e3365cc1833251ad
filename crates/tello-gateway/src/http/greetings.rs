//! Smoke-test endpoints used when wiring up DNS and mail credentials.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tello_mail::{compose, send_once};

use super::ApiError;
use crate::app::AppState;

/// GET /greetings: plain-text hello.
pub async fn greetings_handler() -> &'static str {
    "Hola Mariana"
}

/// GET /greetings-email?message=&email=: send `message` to `email`.
pub async fn greetings_email_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let get = |key: &str| {
        params
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let (message, email) = match (get("message"), get("email")) {
        (Some(m), Some(e)) => (m, e),
        (m, e) => {
            let missing: Vec<&str> = [("message", m.is_none()), ("email", e.is_none())]
                .into_iter()
                .filter_map(|(k, absent)| absent.then_some(k))
                .collect();
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Missing required parameters - message and email",
                    "missing_fields": missing,
                })),
            ));
        }
    };

    let outcome = send_once(
        state.tryouts_mail.as_ref(),
        &compose::greeting(&email, &message),
    )
    .await;
    Ok(Json(json!({
        "success": outcome.sent,
        "message": if outcome.sent { "Email sent" } else { "Email could not be sent" },
        "email_sent": outcome.sent,
    })))
}

#[cfg(test)]
mod tests {
    use crate::app::testing::app;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn sends_the_message() {
        let app = app();
        let (status, body) = app
            .get_json("/greetings-email?message=Hola&email=ana%40example.com", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email_sent"], true);
        let sent = app.tryouts.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Hello from API");
        assert_eq!(sent[0].text, "Hola");
        assert_eq!(sent[0].to, vec!["ana@example.com"]);
    }

    #[tokio::test]
    async fn missing_email_is_rejected() {
        let app = app();
        let (status, body) = app.get_json("/greetings-email?message=Hola", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["missing_fields"][0], "email");
        assert!(app.tryouts.sent().is_empty());
    }

    #[tokio::test]
    async fn plain_greeting() {
        let (status, body) = app()
            .send(Request::get("/greetings").body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Hola Mariana");
    }
}
