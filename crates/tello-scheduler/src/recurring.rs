use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;
use tello_core::types::weekday_from_dia;
use tello_core::{NewReserva, Reserva, ReservaFija};
use tello_store::Repositories;
use tracing::{debug, info, warn};

use crate::error::Result;

/// How many calendar weeks of bookings each template keeps ahead of today.
pub const WEEKS_AHEAD: i64 = 8;

#[derive(Debug, Clone, Serialize)]
pub struct MaterializeReport {
    pub created_count: usize,
    pub created: Vec<Reserva>,
}

/// First date on or after `base` that falls on `dia` (0 = Sunday .. 6 = Saturday).
pub fn next_occurrence(base: NaiveDate, dia: i64) -> Result<NaiveDate> {
    let target = weekday_from_dia(dia)?;
    Ok(next_weekday(base, target))
}

fn next_weekday(base: NaiveDate, target: Weekday) -> NaiveDate {
    let today = base.weekday().num_days_from_sunday() as i64;
    let wanted = target.num_days_from_sunday() as i64;
    base + Duration::days((wanted - today).rem_euclid(7))
}

/// Start/end timestamps of a template for each of the next [`WEEKS_AHEAD`] weeks.
///
/// A template whose end time is not after its start time runs past midnight,
/// so its end lands on the following day.
pub fn occurrences(
    fija: &ReservaFija,
    today: NaiveDate,
) -> Result<Vec<(NaiveDateTime, NaiveDateTime)>> {
    let weekday = fija.weekday()?;
    let mut slots = Vec::with_capacity(WEEKS_AHEAD as usize);
    for week in 0..WEEKS_AHEAD {
        let date = next_weekday(today + Duration::days(7 * week), weekday);
        if date < today {
            continue;
        }
        let start = date.and_time(fija.hora_inicio);
        let mut end = date.and_time(fija.hora_fin);
        if end <= start {
            end += Duration::days(1);
        }
        slots.push((start, end));
    }
    Ok(slots)
}

fn booking_for(fija: &ReservaFija, start: NaiveDateTime, end: NaiveDateTime) -> NewReserva {
    NewReserva {
        cancha_id: fija.cancha_id,
        hora_inicio: start,
        hora_fin: end,
        nombre_reserva: fija.nombre_reserva.clone(),
        celular_reserva: fija.celular_reserva.clone(),
        correo_reserva: fija.correo_reserva.clone(),
        precio: fija.precio,
        arbitro: fija.arbitro,
        confirmada: false,
        reserva_fija_id: Some(fija.id),
    }
}

/// Insert every missing booking for every template.
///
/// Existing bookings are never touched; (template id, start) identifies a
/// booking that already exists, so running twice creates nothing new. Any
/// store failure aborts the run.
pub async fn materialize(repos: &Repositories, today: NaiveDate) -> Result<MaterializeReport> {
    let fijas = repos.fijas.list_fijas().await?;
    info!(templates = fijas.len(), %today, "materializing recurring bookings");

    let mut created = Vec::new();
    for fija in &fijas {
        let slots = match occurrences(fija, today) {
            Ok(slots) => slots,
            Err(e) => {
                warn!(reserva_fija_id = fija.id, dia = fija.dia, error = %e, "skipping template");
                continue;
            }
        };

        for (start, end) in slots {
            let existing = repos.reservas.find_by_template_start(fija.id, start).await?;
            if !existing.is_empty() {
                debug!(reserva_fija_id = fija.id, %start, "booking already exists");
                continue;
            }
            let reserva = repos.reservas.insert(&booking_for(fija, start, end)).await?;
            info!(
                reserva_id = reserva.id,
                reserva_fija_id = fija.id,
                %start,
                "recurring booking created"
            );
            created.push(reserva);
        }
    }

    Ok(MaterializeReport {
        created_count: created.len(),
        created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn next_occurrence_stays_within_a_week() {
        let mut base = date(2025, 2, 24);
        for _ in 0..14 {
            for dia in 0..=6 {
                let next = next_occurrence(base, dia).unwrap();
                assert!(next >= base);
                assert!(next <= base + Duration::days(6));
                assert_eq!(next.weekday().num_days_from_sunday() as i64, dia);
            }
            base += Duration::days(1);
        }
    }

    #[test]
    fn same_weekday_is_today() {
        // 2025-03-05 is a Wednesday
        assert_eq!(next_occurrence(date(2025, 3, 5), 3).unwrap(), date(2025, 3, 5));
        assert_eq!(next_occurrence(date(2025, 3, 5), 0).unwrap(), date(2025, 3, 9));
        assert_eq!(next_occurrence(date(2025, 3, 5), 2).unwrap(), date(2025, 3, 11));
    }

    #[test]
    fn invalid_dia_is_an_error() {
        assert!(next_occurrence(date(2025, 3, 5), 7).is_err());
        assert!(next_occurrence(date(2025, 3, 5), -1).is_err());
    }
}
