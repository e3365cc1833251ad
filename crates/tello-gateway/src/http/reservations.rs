//! Booking confirmation: POST /tellos/confirm-reservation.
//!
//! The booking site posts the full booking right after it is created; the
//! handler only formats it and sends the confirmation email.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Map, Value};
use tello_core::display::{si_no, spanish_date, thousands, time_range, ReservationDisplay};
use tello_core::timefmt::parse_strict;
use tello_core::Site;
use tello_mail::compose;
use tracing::info;

use super::{bad_request, parse_object, require, send_composed, text_field, ApiError};
use crate::app::AppState;

const REQUIRED: [&str; 13] = [
    "reserva_id",
    "hora_inicio",
    "hora_fin",
    "cancha_id",
    "cancha_nombre",
    "cancha_local",
    "nombre_reserva",
    "celular_reserva",
    "correo_reserva",
    "precio",
    "arbitro",
    "jugadores",
    "reserva_url",
];

pub async fn confirm_reservation(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let data = parse_object(&body)?;
    require(&data, &REQUIRED)?;

    let invalid_datetime =
        || bad_request("Invalid datetime format. Expected format: YYYY-MM-DD HH:MM:SS");
    let inicio = parse_strict(&text_field(&data, "hora_inicio")).map_err(|_| invalid_datetime())?;
    let fin = parse_strict(&text_field(&data, "hora_fin")).map_err(|_| invalid_datetime())?;

    let reserva_id = numeric_field(&data, "reserva_id")?;
    let local_id = numeric_field(&data, "cancha_local")?;
    let precio = numeric_field(&data, "precio")?;

    let booking = ReservationDisplay {
        reserva_id,
        nombre_reserva: text_field(&data, "nombre_reserva"),
        celular_reserva: text_field(&data, "celular_reserva"),
        correo_reserva: text_field(&data, "correo_reserva"),
        cancha_nombre: text_field(&data, "cancha_nombre"),
        local_nombre: Site::from_id(local_id).name().to_string(),
        local_id,
        fecha: spanish_date(inicio.date()),
        hora: time_range(&inicio, &fin),
        jugadores: text_field(&data, "jugadores"),
        arbitro: si_no(truthy(data.get("arbitro"))).to_string(),
        precio_total: thousands(precio),
        reserva_url: text_field(&data, "reserva_url"),
    };
    info!(reserva_id, cancha = %booking.cancha_nombre, "confirming reservation");

    let outcome = send_composed(
        state.tellos_mail.as_ref(),
        compose::reservation_confirmation(&booking),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Reservation confirmed successfully",
        "email_sent": outcome.sent,
        "reserva_id": data.get("reserva_id").cloned().unwrap_or(Value::Null),
        "nombre_reserva": booking.nombre_reserva,
    })))
}

/// A required integer field; present but non-numeric is a 400.
fn numeric_field(data: &Map<String, Value>, key: &str) -> Result<i64, ApiError> {
    data.get(key)
        .and_then(as_i64)
        .ok_or_else(|| bad_request(&format!("Invalid numeric field: {key}")))
}

/// Integers may arrive as numbers or numeric strings.
fn as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn truthy(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => {
            matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "si" | "sí")
        }
        _ => false,
    }
}
