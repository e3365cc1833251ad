//! Scheduled-job endpoints, called by an external cron runner.
//!
//! Auth: `Authorization: Bearer <cron.secret>` (skipped when the secret is
//! empty). Each run gets a `run_id` that appears in the logs and the reply.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tello_core::timefmt::parse_date;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::{bad_request, internal_error, ApiError};
use crate::app::AppState;
use crate::auth::check_cron_secret;
use crate::jobs;

/// GET /tellos/cron/send-24h-reminders
pub async fn send_reminders(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    check_cron_secret(&state, &headers)?;
    let run_id = Uuid::new_v4().to_string();
    info!(run_id = %run_id, "reminder run started");

    let report = jobs::run_reminders(&state)
        .instrument(info_span!("cron", job = "reminders", %run_id))
        .await
        .map_err(|e| internal_error("reminder run", e))?;

    if report.checked == 0 {
        return Ok(Json(json!({
            "success": true,
            "message": "No reservations need reminders at this time",
            "run_id": run_id,
            "emails_sent": 0,
            "emails_failed": 0,
            "summary_sent": false,
        })));
    }

    Ok(Json(json!({
        "success": true,
        "message": format!("Processed {} reservations", report.checked),
        "run_id": run_id,
        "emails_sent": report.emails_sent(),
        "emails_failed": report.emails_failed(),
        "summary_sent": report.summary_sent,
        "results": {
            "success": report.sent,
            "failed": report.failed,
        },
    })))
}

/// GET /tellos/cron/materialize-recurring
pub async fn materialize_recurring(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    check_cron_secret(&state, &headers)?;
    let run_id = Uuid::new_v4().to_string();
    info!(run_id = %run_id, "materialize run started");

    let report = jobs::run_materialize(&state)
        .instrument(info_span!("cron", job = "materialize", %run_id))
        .await
        .map_err(|e| internal_error("materialize run", e))?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Created {} recurring reservations", report.created_count),
        "run_id": run_id,
        "created_count": report.created_count,
        "created": report.created,
    })))
}

/// GET /tellos/cron/daily-schedule?date=YYYY-MM-DD
pub async fn daily_schedule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    check_cron_secret(&state, &headers)?;
    let date = agenda_date(&state, &params)?;
    let run_id = Uuid::new_v4().to_string();
    info!(run_id = %run_id, %date, "daily schedule run started");

    let report = jobs::run_daily_schedule(&state, date)
        .instrument(info_span!("cron", job = "daily_schedule", %run_id))
        .await
        .map_err(|e| internal_error("daily schedule", e))?;

    Ok(Json(json!({
        "success": true,
        "run_id": run_id,
        "date": report.date,
        "fecha": report.fecha,
        "reservas": report.reservas,
        "email_sent": report.email_sent,
    })))
}

/// `?date=` when given, otherwise today at the site.
pub fn agenda_date(
    state: &AppState,
    params: &HashMap<String, String>,
) -> Result<NaiveDate, ApiError> {
    match params.get("date").map(|d| d.trim()).filter(|d| !d.is_empty()) {
        Some(raw) => parse_date(raw)
            .map_err(|_| bad_request("Invalid date format. Expected format: YYYY-MM-DD")),
        None => Ok(state.today()),
    }
}

#[cfg(test)]
mod tests {
    use crate::app::testing::{app, app_with};
    use axum::http::StatusCode;
    use chrono::{Duration, NaiveTime};
    use std::sync::{Arc, Mutex};
    use tello_core::{Cancha, Capacity, Reserva, ReservaFija, TelloConfig};

    fn secured() -> TelloConfig {
        let mut config = TelloConfig::default();
        config.cron.secret = "s3cret".into();
        config
    }

    #[tokio::test]
    async fn wrong_secret_is_unauthorized() {
        let app = app_with(secured());
        for uri in [
            "/tellos/cron/send-24h-reminders",
            "/tellos/cron/materialize-recurring",
            "/tellos/cron/daily-schedule",
        ] {
            let (status, body) = app.get_json(uri, Some("nope")).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["error"], "Unauthorized");

            let (status, _) = app.get_json(uri, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn right_secret_passes() {
        let app = app_with(secured());
        let (status, body) = app
            .get_json("/tellos/cron/send-24h-reminders", Some("s3cret"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "No reservations need reminders at this time");
        assert_eq!(body["emails_sent"], 0);
    }

    #[tokio::test]
    async fn reminders_run_against_the_store() {
        let app = app();
        app.store.add_cancha(Cancha {
            id: 1,
            nombre: "Cancha 1".into(),
            local: 2,
            cantidad: Some(Capacity::Fixed(7)),
        });
        // the handler reads the real clock, so place the booking relative to it
        let tz = TelloConfig::default().site.tz().unwrap();
        let start = tello_scheduler::wall_clock_now(tz) + Duration::hours(3);
        app.store.add_reserva(Reserva {
            id: 8,
            cancha_id: 1,
            hora_inicio: start,
            hora_fin: start + Duration::hours(1),
            nombre_reserva: "Ana".into(),
            celular_reserva: None,
            correo_reserva: Some("ana@example.com".into()),
            precio: 30000,
            arbitro: true,
            confirmada: true,
            reserva_fija_id: None,
            recordatorio_24h_enviado: None,
            comprobante: None,
        });

        let (status, body) = app.get_json("/tellos/cron/send-24h-reminders", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Processed 1 reservations");
        assert_eq!(body["emails_sent"], 1);
        assert_eq!(body["summary_sent"], true);
        assert_eq!(app.tellos.sent().len(), 2);
        assert!(app.store.reserva(8).unwrap().recordatorio_24h_enviado.is_some());
    }

    #[tokio::test]
    async fn materialize_is_idempotent_over_http() {
        let app = app();
        app.store.add_fija(ReservaFija {
            id: 3,
            cancha_id: 1,
            dia: 2,
            hora_inicio: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            hora_fin: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            nombre_reserva: "Liga".into(),
            celular_reserva: None,
            correo_reserva: None,
            precio: 40000,
            arbitro: false,
        });

        let (status, body) = app.get_json("/tellos/cron/materialize-recurring", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["created_count"], 8);
        assert_eq!(body["created"].as_array().unwrap().len(), 8);

        let (_, body) = app.get_json("/tellos/cron/materialize-recurring", None).await;
        assert_eq!(body["created_count"], 0);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn job_log_lines_carry_the_run_id() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let app = app();
        app.store.add_fija(ReservaFija {
            id: 4,
            cancha_id: 1,
            dia: 5,
            hora_inicio: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            hora_fin: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            nombre_reserva: "Viernes".into(),
            celular_reserva: None,
            correo_reserva: None,
            precio: 40000,
            arbitro: false,
        });
        let (status, body) = app.get_json("/tellos/cron/materialize-recurring", None).await;
        assert_eq!(status, StatusCode::OK);
        let run_id = body["run_id"].as_str().unwrap().to_string();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let line = output
            .lines()
            .find(|l| l.contains("materializing recurring bookings"))
            .expect("scheduler log line");
        assert!(line.contains(&format!("run_id={run_id}")), "{line}");
    }

    #[tokio::test]
    async fn daily_schedule_emails_the_pdf() {
        let app = app();
        app.store.add_cancha(Cancha {
            id: 1,
            nombre: "Cancha 1".into(),
            local: 1,
            cantidad: None,
        });

        let (status, body) = app
            .get_json("/tellos/cron/daily-schedule?date=2025-03-02", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["date"], "2025-03-02");
        assert_eq!(body["reservas"], 0);
        assert_eq!(body["email_sent"], true);

        let sent = app.tellos.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].attachments[0].filename, "agenda-2025-03-02.pdf");
        assert!(sent[0].attachments[0].data.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn bad_date_is_rejected() {
        let (status, body) = app()
            .get_json("/tellos/cron/daily-schedule?date=02-03-2025", None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid date format"));
    }
}
