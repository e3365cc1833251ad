//! Minimal PostgREST filter builder.
//!
//! Each filter becomes one `column=op.value` query parameter; reqwest takes
//! care of URL encoding.

use std::fmt::Display;

use chrono::NaiveDateTime;
use tello_core::timefmt::format_timestamp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: &'static str,
    params: Vec<(String, String)>,
}

impl Query {
    /// `SELECT *` on `table` with no filters.
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            params: vec![("select".to_string(), "*".to_string())],
        }
    }

    /// Query used for PATCH requests: filters only, no `select`.
    pub fn update(table: &'static str) -> Self {
        Self {
            table,
            params: Vec::new(),
        }
    }

    pub fn table_name(&self) -> &'static str {
        self.table
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, format!("eq.{value}"))
    }

    pub fn gte(self, column: &str, value: &NaiveDateTime) -> Self {
        self.filter(column, format!("gte.{}", format_timestamp(value)))
    }

    pub fn lte(self, column: &str, value: &NaiveDateTime) -> Self {
        self.filter(column, format!("lte.{}", format_timestamp(value)))
    }

    pub fn eq_timestamp(self, column: &str, value: &NaiveDateTime) -> Self {
        self.filter(column, format!("eq.{}", format_timestamp(value)))
    }

    pub fn is_null(self, column: &str) -> Self {
        self.filter(column, "is.null".to_string())
    }

    pub fn not_null(self, column: &str) -> Self {
        self.filter(column, "not.is.null".to_string())
    }

    pub fn in_ids(self, column: &str, ids: &[i64]) -> Self {
        let list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.filter(column, format!("in.({list})"))
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.params
            .push(("order".to_string(), format!("{column}.asc")));
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    fn filter(mut self, column: &str, expr: String) -> Self {
        self.params.push((column.to_string(), expr));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn reminder_filters() {
        let from = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let to = from + chrono::Duration::hours(24);
        let q = Query::table("reservas")
            .is_null("recordatorio_24h_enviado")
            .not_null("correo_reserva")
            .gte("hora_inicio", &from)
            .lte("hora_inicio", &to);

        let params: Vec<(&str, &str)> = q
            .params()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            params,
            vec![
                ("select", "*"),
                ("recordatorio_24h_enviado", "is.null"),
                ("correo_reserva", "not.is.null"),
                ("hora_inicio", "gte.2025-03-01 10:00:00"),
                ("hora_inicio", "lte.2025-03-02 10:00:00"),
            ]
        );
    }

    #[test]
    fn in_list_and_order() {
        let q = Query::table("canchas").in_ids("id", &[3, 1, 2]).order_asc("id");
        assert_eq!(q.params()[1], ("id".to_string(), "in.(3,1,2)".to_string()));
        assert_eq!(q.params()[2], ("order".to_string(), "id.asc".to_string()));
    }

    #[test]
    fn update_query_has_no_select() {
        let q = Query::update("reservas").eq("id", 9);
        assert_eq!(q.params(), &[("id".to_string(), "eq.9".to_string())]);
        assert_eq!(q.table_name(), "reservas");
    }
}
