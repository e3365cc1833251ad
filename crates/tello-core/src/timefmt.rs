//! Timestamp handling for the store's naive wall-clock columns.
//!
//! The store keeps `hora_inicio`/`hora_fin` as Costa Rica local time with no
//! offset. Rows come back either as `2025-03-02 14:00:00` (what we write) or
//! ISO-8601 (`2025-03-02T14:00:00`, sometimes with a fraction or an offset,
//! e.g. for `recordatorio_24h_enviado`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Result, TelloError};

/// Format used for every timestamp we write.
pub const STORE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a store timestamp in any of the accepted shapes.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, STORE_FORMAT) {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(dt);
    }
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Ok(dt);
    }
    // offset-carrying values keep their wall clock
    let normalized = s.replace('Z', "+00:00");
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(dt.naive_local());
    }
    Err(TelloError::InvalidTimestamp(raw.to_string()))
}

/// Strict parse used for request payloads: only `YYYY-MM-DD HH:MM:SS`.
pub fn parse_strict(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, STORE_FORMAT)
        .map_err(|_| TelloError::InvalidTimestamp(raw.to_string()))
}

pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(STORE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| TelloError::InvalidTimestamp(raw.to_string()))
}

/// Parse a time-of-day column: `HH:MM:SS`, `HH:MM:SS.ffffff` or `HH:MM`.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
    let s = raw.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| TelloError::InvalidTimestamp(raw.to_string()))
}

/// `#[serde(with = "timefmt::naive")]`
pub mod naive {
    use chrono::NaiveDateTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw).map_err(D::Error::custom)
    }
}

/// `#[serde(with = "timefmt::naive_opt")]`: `null` or missing maps to `None`.
pub mod naive_opt {
    use chrono::NaiveDateTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => s.serialize_str(&super::format_timestamp(dt)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => {
                super::parse_timestamp(&raw).map(Some).map_err(D::Error::custom)
            }
            _ => Ok(None),
        }
    }
}

/// `#[serde(with = "timefmt::time_of_day")]`
pub mod time_of_day {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time_of_day(&raw).map_err(D::Error::custom)
    }
}

/// Treat an explicit JSON `null` like a missing field.
pub fn null_default<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    use serde::Deserialize;
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn parses_store_format() {
        assert_eq!(
            parse_timestamp("2025-03-02 14:00:00").unwrap(),
            at(2025, 3, 2, 14, 0, 0)
        );
    }

    #[test]
    fn parses_iso_variants() {
        assert_eq!(
            parse_timestamp("2025-03-02T14:00:00").unwrap(),
            at(2025, 3, 2, 14, 0, 0)
        );
        assert_eq!(
            parse_timestamp("2025-03-02T14:00:00.250").unwrap().second(),
            0
        );
        // wall clock is kept, not converted
        assert_eq!(
            parse_timestamp("2025-03-02T14:00:00-06:00").unwrap(),
            at(2025, 3, 2, 14, 0, 0)
        );
        assert_eq!(
            parse_timestamp("2025-03-02T20:00:00Z").unwrap(),
            at(2025, 3, 2, 20, 0, 0)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("mañana a las 3").is_err());
        assert!(parse_strict("2025-03-02T14:00:00").is_err());
    }

    #[test]
    fn time_of_day_accepts_short_form() {
        assert_eq!(
            parse_time_of_day("14:00").unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time_of_day("07:30:00").unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
    }
}
