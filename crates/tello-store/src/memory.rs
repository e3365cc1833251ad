use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tello_core::{Cancha, NewReserva, Pago, Reserva, ReservaFija};

use crate::error::{Result, StoreError};
use crate::repo::{CanchaRepository, PagoRepository, ReservaFijaRepository, ReservaRepository};

#[derive(Default)]
struct Tables {
    canchas: Vec<Cancha>,
    reservas: Vec<Reserva>,
    fijas: Vec<ReservaFija>,
    pagos: Vec<Pago>,
    last_id: i64,
    reject_writes: bool,
}

/// In-process store with the same filter semantics as [`SupabaseStore`].
///
/// Used by the test suites and when the gateway starts without a store URL.
///
/// [`SupabaseStore`]: crate::SupabaseStore
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_cancha(&self, cancha: Cancha) {
        self.lock().canchas.push(cancha);
    }

    pub fn add_fija(&self, fija: ReservaFija) {
        self.lock().fijas.push(fija);
    }

    pub fn add_pago(&self, pago: Pago) {
        self.lock().pagos.push(pago);
    }

    /// Store a booking as-is, keeping its id.
    pub fn add_reserva(&self, reserva: Reserva) {
        let mut tables = self.lock();
        tables.last_id = tables.last_id.max(reserva.id);
        tables.reservas.push(reserva);
    }

    /// Snapshot of every booking, in insertion order.
    pub fn reservas(&self) -> Vec<Reserva> {
        self.lock().reservas.clone()
    }

    pub fn reserva(&self, id: i64) -> Option<Reserva> {
        self.lock().reservas.iter().find(|r| r.id == id).cloned()
    }

    /// Make every subsequent insert/update fail, to exercise error paths.
    pub fn reject_writes(&self, reject: bool) {
        self.lock().reject_writes = reject;
    }
}

fn in_window(r: &Reserva, from: &NaiveDateTime, to: &NaiveDateTime) -> bool {
    r.hora_inicio >= *from && r.hora_inicio <= *to
}

fn sorted_by_start(mut rows: Vec<Reserva>) -> Vec<Reserva> {
    rows.sort_by_key(|r| (r.hora_inicio, r.id));
    rows
}

#[async_trait]
impl ReservaRepository for MemoryStore {
    async fn pending_reminders(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Reserva>> {
        let rows = self
            .lock()
            .reservas
            .iter()
            .filter(|r| {
                r.recordatorio_24h_enviado.is_none()
                    && r.correo_reserva.is_some()
                    && in_window(r, &from, &to)
            })
            .cloned()
            .collect();
        Ok(sorted_by_start(rows))
    }

    async fn find_by_template_start(
        &self,
        reserva_fija_id: i64,
        hora_inicio: NaiveDateTime,
    ) -> Result<Vec<Reserva>> {
        Ok(self
            .lock()
            .reservas
            .iter()
            .filter(|r| r.reserva_fija_id == Some(reserva_fija_id) && r.hora_inicio == hora_inicio)
            .cloned()
            .collect())
    }

    async fn starting_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Reserva>> {
        let rows = self
            .lock()
            .reservas
            .iter()
            .filter(|r| in_window(r, &from, &to))
            .cloned()
            .collect();
        Ok(sorted_by_start(rows))
    }

    async fn insert(&self, new: &NewReserva) -> Result<Reserva> {
        let mut tables = self.lock();
        if tables.reject_writes {
            return Err(StoreError::Rejected("insert into reservas".to_string()));
        }
        tables.last_id += 1;
        let reserva = new.clone().into_reserva(tables.last_id);
        tables.reservas.push(reserva.clone());
        Ok(reserva)
    }

    async fn mark_reminder_sent(&self, id: i64, at: NaiveDateTime) -> Result<()> {
        let mut tables = self.lock();
        if tables.reject_writes {
            return Err(StoreError::Rejected(format!("update reservas id={id}")));
        }
        // PostgREST PATCH with no matching row is not an error either
        if let Some(r) = tables.reservas.iter_mut().find(|r| r.id == id) {
            r.recordatorio_24h_enviado = Some(at);
        }
        Ok(())
    }
}

#[async_trait]
impl CanchaRepository for MemoryStore {
    async fn list_canchas(&self) -> Result<Vec<Cancha>> {
        let mut rows = self.lock().canchas.clone();
        rows.sort_by_key(|c| c.id);
        Ok(rows)
    }

    async fn canchas_by_ids(&self, ids: &[i64]) -> Result<Vec<Cancha>> {
        Ok(self
            .lock()
            .canchas
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReservaFijaRepository for MemoryStore {
    async fn list_fijas(&self) -> Result<Vec<ReservaFija>> {
        let mut rows = self.lock().fijas.clone();
        rows.sort_by_key(|f| f.id);
        Ok(rows)
    }
}

#[async_trait]
impl PagoRepository for MemoryStore {
    async fn pagos_for_reservas(&self, reserva_ids: &[i64]) -> Result<Vec<Pago>> {
        Ok(self
            .lock()
            .pagos
            .iter()
            .filter(|p| reserva_ids.contains(&p.reserva_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 2)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn reserva(id: i64, start: NaiveDateTime, email: Option<&str>) -> Reserva {
        Reserva {
            id,
            cancha_id: 1,
            hora_inicio: start,
            hora_fin: start + Duration::hours(1),
            nombre_reserva: format!("cliente {id}"),
            celular_reserva: None,
            correo_reserva: email.map(str::to_string),
            precio: 20000,
            arbitro: false,
            confirmada: true,
            reserva_fija_id: None,
            recordatorio_24h_enviado: None,
            comprobante: None,
        }
    }

    #[tokio::test]
    async fn pending_reminders_applies_every_filter() {
        let store = MemoryStore::new();
        store.add_reserva(reserva(1, at(10), Some("a@example.com")));
        store.add_reserva(reserva(2, at(12), None));
        let mut stamped = reserva(3, at(11), Some("c@example.com"));
        stamped.recordatorio_24h_enviado = Some(at(8));
        store.add_reserva(stamped);
        store.add_reserva(reserva(4, at(20), Some("d@example.com")));

        let rows = store.pending_reminders(at(10), at(18)).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryStore::new();
        store.add_reserva(reserva(40, at(9), None));
        let new = NewReserva {
            cancha_id: 1,
            hora_inicio: at(14),
            hora_fin: at(15),
            nombre_reserva: "Liga".into(),
            celular_reserva: None,
            correo_reserva: None,
            precio: 0,
            arbitro: false,
            confirmada: false,
            reserva_fija_id: Some(2),
        };
        let created = store.insert(&new).await.unwrap();
        assert_eq!(created.id, 41);
        assert_eq!(
            store.find_by_template_start(2, at(14)).await.unwrap().len(),
            1
        );
        assert!(store.find_by_template_start(2, at(15)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_writes_surface_as_errors() {
        let store = MemoryStore::new();
        store.add_reserva(reserva(1, at(10), Some("a@example.com")));
        store.reject_writes(true);
        assert!(store.mark_reminder_sent(1, at(9)).await.is_err());
        assert!(store.reserva(1).unwrap().recordatorio_24h_enviado.is_none());
    }
}
