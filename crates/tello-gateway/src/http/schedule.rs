use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use tello_agenda::{file_name, load_agenda, render_pdf};

use super::{cron::agenda_date, internal_error, ApiError};
use crate::app::AppState;
use crate::auth::check_cron_secret;

/// GET /tellos/schedule.pdf?date=YYYY-MM-DD returns the agenda document itself.
///
/// Same secret as the cron endpoints; the document lists customer phones.
pub async fn schedule_pdf(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    check_cron_secret(&state, &headers)?;
    let date = agenda_date(&state, &params)?;

    let agenda = load_agenda(&state.repos, date)
        .await
        .map_err(|e| internal_error("loading agenda", e))?;
    let pdf = render_pdf(&agenda).map_err(|e| internal_error("rendering agenda", e))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", file_name(&agenda)),
            ),
        ],
        pdf,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use crate::app::testing::app;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn returns_pdf_bytes() {
        let (status, body) = app()
            .send(
                Request::get("/tellos/schedule.pdf?date=2025-03-02")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with(b"%PDF"));
    }
}
