//! Tryout applications: POST /fcprosoccertryouts/submit-application.
//!
//! Request:  `{"name", "country", "email", "age", "team", "program",
//!             "highlights"?, "phone"?}`
//! Response: `{"success", "message", "applicant_email_sent",
//!             "admin_email_sent", "applicant_name"}`

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};
use tello_mail::compose::{self, Application};
use tracing::info;

use super::{parse_object, require, send_composed, text_field, ApiError};
use crate::app::AppState;

const REQUIRED: [&str; 6] = ["name", "country", "email", "age", "team", "program"];
const NOT_PROVIDED: &str = "Not provided";

pub async fn submit_application(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let data = parse_object(&body)?;
    require(&data, &REQUIRED)?;

    let optional = |key: &str| {
        let value = text_field(&data, key);
        if value.is_empty() {
            NOT_PROVIDED.to_string()
        } else {
            value
        }
    };
    let app = Application {
        name: text_field(&data, "name"),
        email: text_field(&data, "email"),
        phone: optional("phone"),
        age: text_field(&data, "age"),
        country: text_field(&data, "country"),
        team: text_field(&data, "team"),
        program: text_field(&data, "program"),
        highlights: optional("highlights"),
    };
    info!(name = %app.name, program = %app.program, "tryout application received");

    let received = chrono::Utc::now()
        .with_timezone(&state.tz)
        .format("%B %d, %Y at %I:%M %p")
        .to_string();
    let mailer = state.tryouts_mail.as_ref();

    let admin = send_composed(
        mailer,
        compose::application_admin_notification(
            &state.config.notify.application_admins,
            &app,
            &received,
        ),
    )
    .await;
    let applicant = send_composed(mailer, compose::application_confirmation(&app)).await;

    Ok(Json(json!({
        "success": true,
        "message": "Application received successfully",
        "applicant_email_sent": applicant.sent,
        "admin_email_sent": admin.sent,
        "applicant_name": app.name,
    })))
}
