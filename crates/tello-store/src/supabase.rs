use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tello_core::timefmt::format_timestamp;
use tello_core::{Cancha, NewReserva, Pago, Reserva, ReservaFija};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::repo::{CanchaRepository, PagoRepository, ReservaFijaRepository, ReservaRepository};

const RESERVAS: &str = "reservas";
const CANCHAS: &str = "canchas";
const RESERVAS_FIJAS: &str = "reservas_fijas";
const PAGOS: &str = "pagos";

/// Supabase REST client (PostgREST under `/rest/v1`).
///
/// Uses the server-side secret key for both `apikey` and the bearer token,
/// which bypasses row-level security.
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl SupabaseStore {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
        }
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
    }

    async fn fetch<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>> {
        let table = query.table_name();
        debug!(table, params = ?query.params(), "store select");

        let builder = self.client.get(self.endpoint(table)).query(query.params());
        let resp = check(self.apply_auth(builder).send().await?).await?;

        resp.json::<Vec<T>>().await.map_err(|e| StoreError::Decode {
            table: table.to_string(),
            reason: e.to_string(),
        })
    }

    async fn insert_row<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T> {
        debug!(table, "store insert");

        let builder = self
            .client
            .post(self.endpoint(table))
            .header("Prefer", "return=representation")
            .json(body);
        let resp = check(self.apply_auth(builder).send().await?).await?;

        let mut rows = resp.json::<Vec<T>>().await.map_err(|e| StoreError::Decode {
            table: table.to_string(),
            reason: e.to_string(),
        })?;
        if rows.is_empty() {
            return Err(StoreError::EmptyInsert {
                table: table.to_string(),
            });
        }
        Ok(rows.remove(0))
    }

    async fn patch(&self, query: &Query, body: &serde_json::Value) -> Result<()> {
        let table = query.table_name();
        debug!(table, params = ?query.params(), "store update");

        let builder = self
            .client
            .patch(self.endpoint(table))
            .query(query.params())
            .json(body);
        check(self.apply_auth(builder).send().await?).await?;
        Ok(())
    }
}

/// Turn non-2xx responses into `StoreError::Api`, keeping the body for logs.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    warn!(status, body = %message, "store API error");
    Err(StoreError::Api { status, message })
}

#[async_trait]
impl ReservaRepository for SupabaseStore {
    async fn pending_reminders(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Reserva>> {
        let query = Query::table(RESERVAS)
            .is_null("recordatorio_24h_enviado")
            .not_null("correo_reserva")
            .gte("hora_inicio", &from)
            .lte("hora_inicio", &to)
            .order_asc("hora_inicio");
        self.fetch(&query).await
    }

    async fn find_by_template_start(
        &self,
        reserva_fija_id: i64,
        hora_inicio: NaiveDateTime,
    ) -> Result<Vec<Reserva>> {
        let query = Query::table(RESERVAS)
            .eq("reserva_fija_id", reserva_fija_id)
            .eq_timestamp("hora_inicio", &hora_inicio);
        self.fetch(&query).await
    }

    async fn starting_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Reserva>> {
        let query = Query::table(RESERVAS)
            .gte("hora_inicio", &from)
            .lte("hora_inicio", &to)
            .order_asc("hora_inicio");
        self.fetch(&query).await
    }

    async fn insert(&self, new: &NewReserva) -> Result<Reserva> {
        self.insert_row(RESERVAS, new).await
    }

    async fn mark_reminder_sent(&self, id: i64, at: NaiveDateTime) -> Result<()> {
        let query = Query::update(RESERVAS).eq("id", id);
        let body = json!({ "recordatorio_24h_enviado": format_timestamp(&at) });
        self.patch(&query, &body).await
    }
}

#[async_trait]
impl CanchaRepository for SupabaseStore {
    async fn list_canchas(&self) -> Result<Vec<Cancha>> {
        self.fetch(&Query::table(CANCHAS).order_asc("id")).await
    }

    async fn canchas_by_ids(&self, ids: &[i64]) -> Result<Vec<Cancha>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch(&Query::table(CANCHAS).in_ids("id", ids)).await
    }
}

#[async_trait]
impl ReservaFijaRepository for SupabaseStore {
    async fn list_fijas(&self) -> Result<Vec<ReservaFija>> {
        self.fetch(&Query::table(RESERVAS_FIJAS).order_asc("id")).await
    }
}

#[async_trait]
impl PagoRepository for SupabaseStore {
    async fn pagos_for_reservas(&self, reserva_ids: &[i64]) -> Result<Vec<Pago>> {
        if reserva_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch(&Query::table(PAGOS).in_ids("reserva_id", reserva_ids))
            .await
    }
}
