use chrono::{NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TelloError};
use crate::timefmt::{self, null_default};

/// Physical location. The store keeps it as `canchas.local` (1 or 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Site {
    Sabana,
    Guadalupe,
}

impl Site {
    /// Any id other than 1 is Guadalupe, matching how the booking site
    /// labels fields.
    pub fn from_id(id: i64) -> Self {
        if id == 1 {
            Site::Sabana
        } else {
            Site::Guadalupe
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Site::Sabana => "Sabana",
            Site::Guadalupe => "Guadalupe",
        }
    }
}

/// Team-size capacity: a fixed number (`5`) or a range label (`"7-8-9"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Capacity {
    Fixed(u32),
    Label(String),
}

impl Capacity {
    /// Display label: `"5 vs 5"` for fixed sizes, `"Fútbol 7-8-9"` for ranges.
    pub fn team_label(&self) -> String {
        let raw = match self {
            Capacity::Fixed(n) => n.to_string(),
            Capacity::Label(s) => s.trim().to_string(),
        };
        if raw.contains('-') {
            format!("Fútbol {raw}")
        } else {
            format!("{raw} vs {raw}")
        }
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Capacity::Fixed(5)
    }
}

/// A bookable field (`canchas`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cancha {
    pub id: i64,
    pub nombre: String,
    pub local: i64,
    #[serde(default)]
    pub cantidad: Option<Capacity>,
}

impl Cancha {
    pub fn site(&self) -> Site {
        Site::from_id(self.local)
    }

    pub fn team_label(&self) -> String {
        self.cantidad.clone().unwrap_or_default().team_label()
    }
}

/// A booking (`reservas`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reserva {
    pub id: i64,
    pub cancha_id: i64,
    #[serde(with = "timefmt::naive")]
    pub hora_inicio: NaiveDateTime,
    #[serde(with = "timefmt::naive")]
    pub hora_fin: NaiveDateTime,
    #[serde(default, deserialize_with = "null_default")]
    pub nombre_reserva: String,
    #[serde(default)]
    pub celular_reserva: Option<String>,
    #[serde(default)]
    pub correo_reserva: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub precio: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub arbitro: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub confirmada: bool,
    #[serde(default)]
    pub reserva_fija_id: Option<i64>,
    #[serde(default, with = "timefmt::naive_opt")]
    pub recordatorio_24h_enviado: Option<NaiveDateTime>,
    /// Reference to the uploaded SINPE payment proof, if any.
    #[serde(default)]
    pub comprobante: Option<String>,
}

/// Insert payload for `reservas`; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReserva {
    pub cancha_id: i64,
    #[serde(with = "timefmt::naive")]
    pub hora_inicio: NaiveDateTime,
    #[serde(with = "timefmt::naive")]
    pub hora_fin: NaiveDateTime,
    pub nombre_reserva: String,
    pub celular_reserva: Option<String>,
    pub correo_reserva: Option<String>,
    pub precio: i64,
    pub arbitro: bool,
    pub confirmada: bool,
    pub reserva_fija_id: Option<i64>,
}

impl NewReserva {
    pub fn into_reserva(self, id: i64) -> Reserva {
        Reserva {
            id,
            cancha_id: self.cancha_id,
            hora_inicio: self.hora_inicio,
            hora_fin: self.hora_fin,
            nombre_reserva: self.nombre_reserva,
            celular_reserva: self.celular_reserva,
            correo_reserva: self.correo_reserva,
            precio: self.precio,
            arbitro: self.arbitro,
            confirmada: self.confirmada,
            reserva_fija_id: self.reserva_fija_id,
            recordatorio_24h_enviado: None,
            comprobante: None,
        }
    }
}

/// A weekly recurring booking template (`reservas_fijas`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservaFija {
    pub id: i64,
    pub cancha_id: i64,
    /// 0 = Sunday .. 6 = Saturday.
    pub dia: i64,
    #[serde(with = "timefmt::time_of_day")]
    pub hora_inicio: NaiveTime,
    #[serde(with = "timefmt::time_of_day")]
    pub hora_fin: NaiveTime,
    #[serde(default, deserialize_with = "null_default")]
    pub nombre_reserva: String,
    #[serde(default)]
    pub celular_reserva: Option<String>,
    #[serde(default)]
    pub correo_reserva: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub precio: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub arbitro: bool,
}

impl ReservaFija {
    pub fn weekday(&self) -> Result<Weekday> {
        weekday_from_dia(self.dia)
    }
}

/// Map the store's Sunday-first weekday number to chrono's `Weekday`.
pub fn weekday_from_dia(dia: i64) -> Result<Weekday> {
    match dia {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(TelloError::InvalidWeekday(other)),
    }
}

/// A payment record (`pagos`). Only the booking link is interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pago {
    pub id: i64,
    pub reserva_id: i64,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}
