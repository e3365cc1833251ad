use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tello_core::{Cancha, NewReserva, Pago, Reserva, ReservaFija};

use crate::error::Result;

/// Bookings (`reservas`).
#[async_trait]
pub trait ReservaRepository: Send + Sync {
    /// Bookings with `from <= hora_inicio <= to` (both inclusive) that have a
    /// customer email and no reminder stamp, ordered by start time.
    async fn pending_reminders(&self, from: NaiveDateTime, to: NaiveDateTime)
        -> Result<Vec<Reserva>>;

    /// Bookings materialized from `reserva_fija_id` that start at `hora_inicio`.
    /// This pair is the de-duplication key for recurring bookings.
    async fn find_by_template_start(
        &self,
        reserva_fija_id: i64,
        hora_inicio: NaiveDateTime,
    ) -> Result<Vec<Reserva>>;

    /// Bookings with `from <= hora_inicio <= to`, ordered by start time.
    async fn starting_between(&self, from: NaiveDateTime, to: NaiveDateTime)
        -> Result<Vec<Reserva>>;

    async fn insert(&self, new: &NewReserva) -> Result<Reserva>;

    /// Set `recordatorio_24h_enviado` on one booking.
    async fn mark_reminder_sent(&self, id: i64, at: NaiveDateTime) -> Result<()>;
}

/// Fields (`canchas`).
#[async_trait]
pub trait CanchaRepository: Send + Sync {
    async fn list_canchas(&self) -> Result<Vec<Cancha>>;

    /// Fields whose id is in `ids`. Unknown ids are silently absent.
    async fn canchas_by_ids(&self, ids: &[i64]) -> Result<Vec<Cancha>>;
}

/// Weekly templates (`reservas_fijas`).
#[async_trait]
pub trait ReservaFijaRepository: Send + Sync {
    async fn list_fijas(&self) -> Result<Vec<ReservaFija>>;
}

/// Payments (`pagos`).
#[async_trait]
pub trait PagoRepository: Send + Sync {
    async fn pagos_for_reservas(&self, reserva_ids: &[i64]) -> Result<Vec<Pago>>;
}

/// One handle per collection, cloned into every component that needs data.
#[derive(Clone)]
pub struct Repositories {
    pub reservas: Arc<dyn ReservaRepository>,
    pub canchas: Arc<dyn CanchaRepository>,
    pub fijas: Arc<dyn ReservaFijaRepository>,
    pub pagos: Arc<dyn PagoRepository>,
}

impl Repositories {
    /// Use one backend for all four collections.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ReservaRepository
            + CanchaRepository
            + ReservaFijaRepository
            + PagoRepository
            + 'static,
    {
        Self {
            reservas: store.clone(),
            canchas: store.clone(),
            fijas: store.clone(),
            pagos: store,
        }
    }
}
