//! Spanish display formatting for booking emails.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::types::{Cancha, Reserva, Site};

const MESES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Everything an email template needs to show one booking.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReservationDisplay {
    pub reserva_id: i64,
    pub nombre_reserva: String,
    pub celular_reserva: String,
    pub correo_reserva: String,
    pub cancha_nombre: String,
    pub local_nombre: String,
    pub local_id: i64,
    /// `2 de marzo de 2025`
    pub fecha: String,
    /// `2:00 PM - 3:00 PM`
    pub hora: String,
    /// `5 vs 5` or `Fútbol 7-8-9`
    pub jugadores: String,
    /// `Sí` / `No`
    pub arbitro: String,
    /// `25.000` (colones, dotted thousands)
    pub precio_total: String,
    pub reserva_url: String,
}

impl ReservationDisplay {
    pub fn from_records(reserva: &Reserva, cancha: &Cancha, reserva_url: String) -> Self {
        Self {
            reserva_id: reserva.id,
            nombre_reserva: reserva.nombre_reserva.clone(),
            celular_reserva: reserva.celular_reserva.clone().unwrap_or_default(),
            correo_reserva: reserva.correo_reserva.clone().unwrap_or_default(),
            cancha_nombre: cancha.nombre.clone(),
            local_nombre: cancha.site().name().to_string(),
            local_id: cancha.local,
            fecha: spanish_date(reserva.hora_inicio.date()),
            hora: time_range(&reserva.hora_inicio, &reserva.hora_fin),
            jugadores: cancha.team_label(),
            arbitro: si_no(reserva.arbitro).to_string(),
            precio_total: thousands(reserva.precio),
            reserva_url,
        }
    }

    /// Sabana bookings must be paid by SINPE within two hours; Guadalupe
    /// bookings are paid at the field.
    pub fn requires_sinpe(&self) -> bool {
        Site::from_id(self.local_id) == Site::Sabana
    }
}

/// `2 de marzo de 2025`
pub fn spanish_date(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MESES[date.month0() as usize],
        date.year()
    )
}

/// `9:00 AM`, `12:30 PM`
pub fn clock_12h(dt: &NaiveDateTime) -> String {
    let period = if dt.hour() < 12 { "AM" } else { "PM" };
    format!("{} {}", dt.format("%-I:%M"), period)
}

/// `2:00 PM - 3:00 PM`
pub fn time_range(start: &NaiveDateTime, end: &NaiveDateTime) -> String {
    format!("{} - {}", clock_12h(start), clock_12h(end))
}

/// Group thousands with dots: `25000` → `25.000`.
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

pub fn si_no(flag: bool) -> &'static str {
    if flag {
        "Sí"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Capacity;

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn spanish_dates() {
        assert_eq!(
            spanish_date(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()),
            "2 de marzo de 2025"
        );
        assert_eq!(
            spanish_date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()),
            "31 de diciembre de 2024"
        );
    }

    #[test]
    fn twelve_hour_clock() {
        assert_eq!(clock_12h(&dt(0, 0)), "12:00 AM");
        assert_eq!(clock_12h(&dt(9, 5)), "9:05 AM");
        assert_eq!(clock_12h(&dt(12, 30)), "12:30 PM");
        assert_eq!(clock_12h(&dt(22, 0)), "10:00 PM");
        assert_eq!(time_range(&dt(14, 0), &dt(15, 0)), "2:00 PM - 3:00 PM");
    }

    #[test]
    fn dotted_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(950), "950");
        assert_eq!(thousands(25000), "25.000");
        assert_eq!(thousands(1234567), "1.234.567");
        assert_eq!(thousands(-1500), "-1.500");
    }

    #[test]
    fn display_from_records() {
        let reserva = Reserva {
            id: 77,
            cancha_id: 2,
            hora_inicio: dt(19, 0),
            hora_fin: dt(20, 0),
            nombre_reserva: "Carlos".into(),
            celular_reserva: Some("8888-0000".into()),
            correo_reserva: Some("carlos@example.com".into()),
            precio: 35000,
            arbitro: true,
            confirmada: true,
            reserva_fija_id: None,
            recordatorio_24h_enviado: None,
            comprobante: None,
        };
        let cancha = Cancha {
            id: 2,
            nombre: "Cancha Norte".into(),
            local: 2,
            cantidad: Some(Capacity::Label("7-8-9".into())),
        };
        let ctx = ReservationDisplay::from_records(
            &reserva,
            &cancha,
            "https://futboltello.com/reserva/77".into(),
        );
        assert_eq!(ctx.fecha, "2 de marzo de 2025");
        assert_eq!(ctx.hora, "7:00 PM - 8:00 PM");
        assert_eq!(ctx.local_nombre, "Guadalupe");
        assert_eq!(ctx.jugadores, "Fútbol 7-8-9");
        assert_eq!(ctx.arbitro, "Sí");
        assert_eq!(ctx.precio_total, "35.000");
        assert!(!ctx.requires_sinpe());
    }
}
