use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness probe, returns server metadata.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timezone": state.config.site.timezone,
        "now": tello_core::timefmt::format_timestamp(&state.now()),
    }))
}

#[cfg(test)]
mod tests {
    use crate::app::testing::app;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn reports_ok() {
        let (status, body) = app().get_json("/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["timezone"], "America/Costa_Rica");
    }
}
