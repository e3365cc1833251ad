use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tello_core::display::{spanish_date, time_range};
use tello_core::{Cancha, Pago, Reserva, Site};
use tello_store::Repositories;
use tracing::{debug, warn};

use crate::error::Result;

/// One day of bookings, grouped site → field → booking.
#[derive(Debug, Clone, Serialize)]
pub struct Agenda {
    pub date: NaiveDate,
    /// `2 de marzo de 2025`
    pub fecha: String,
    pub sites: Vec<SiteAgenda>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteAgenda {
    pub site: Site,
    pub canchas: Vec<CanchaAgenda>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CanchaAgenda {
    pub cancha_id: i64,
    pub nombre: String,
    pub jugadores: String,
    /// Empty when the field has no bookings that day.
    pub rows: Vec<AgendaRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgendaRow {
    pub reserva_id: i64,
    pub hora: String,
    pub cliente: String,
    pub celular: String,
    pub arbitro: bool,
    pub precio: i64,
    pub confirmada: bool,
    pub pagos: usize,
}

impl Agenda {
    /// Number of bookings across every site.
    pub fn reserva_count(&self) -> usize {
        self.sites
            .iter()
            .flat_map(|s| &s.canchas)
            .map(|c| c.rows.len())
            .sum()
    }
}

/// Group the day's bookings. Pure; the caller provides the rows.
///
/// Sites come in [`Site`] order, fields by name then id, bookings by start
/// time. Bookings on other days are ignored. A booking whose field is not in
/// `canchas` still shows up, under a placeholder field named after its id.
pub fn build_agenda(
    date: NaiveDate,
    canchas: &[Cancha],
    reservas: &[Reserva],
    pagos: &[Pago],
) -> Agenda {
    let mut pagos_por_reserva: HashMap<i64, usize> = HashMap::new();
    for pago in pagos {
        *pagos_por_reserva.entry(pago.reserva_id).or_default() += 1;
    }

    let mut fields: Vec<Cancha> = canchas.to_vec();
    let mut by_cancha: HashMap<i64, Vec<&Reserva>> = HashMap::new();
    for reserva in reservas.iter().filter(|r| r.hora_inicio.date() == date) {
        by_cancha.entry(reserva.cancha_id).or_default().push(reserva);
    }
    for cancha_id in by_cancha.keys() {
        if !fields.iter().any(|c| c.id == *cancha_id) {
            warn!(cancha_id, "booking on a field that is not in canchas");
            fields.push(Cancha {
                id: *cancha_id,
                nombre: format!("Cancha {cancha_id}"),
                local: 0,
                cantidad: None,
            });
        }
    }
    fields.sort_by(|a, b| a.nombre.cmp(&b.nombre).then(a.id.cmp(&b.id)));

    let mut sites: BTreeMap<Site, Vec<CanchaAgenda>> = BTreeMap::new();
    for cancha in fields {
        let mut day = by_cancha.remove(&cancha.id).unwrap_or_default();
        day.sort_by_key(|r| (r.hora_inicio, r.id));
        let rows = day
            .into_iter()
            .map(|r| AgendaRow {
                reserva_id: r.id,
                hora: time_range(&r.hora_inicio, &r.hora_fin),
                cliente: r.nombre_reserva.clone(),
                celular: r.celular_reserva.clone().unwrap_or_default(),
                arbitro: r.arbitro,
                precio: r.precio,
                confirmada: r.confirmada,
                pagos: pagos_por_reserva.get(&r.id).copied().unwrap_or(0),
            })
            .collect();
        sites.entry(cancha.site()).or_default().push(CanchaAgenda {
            cancha_id: cancha.id,
            jugadores: cancha.team_label(),
            nombre: cancha.nombre,
            rows,
        });
    }

    Agenda {
        date,
        fecha: spanish_date(date),
        sites: sites
            .into_iter()
            .map(|(site, canchas)| SiteAgenda { site, canchas })
            .collect(),
    }
}

/// Read one day's fields, bookings and payments and group them.
pub async fn load_agenda(repos: &Repositories, date: NaiveDate) -> Result<Agenda> {
    let from = date.and_time(NaiveTime::default());
    let to = date.and_hms_opt(23, 59, 59).unwrap_or(from);
    let canchas = repos.canchas.list_canchas().await?;
    let reservas = repos.reservas.starting_between(from, to).await?;
    let ids: Vec<i64> = reservas.iter().map(|r| r.id).collect();
    let pagos = repos.pagos.pagos_for_reservas(&ids).await?;
    debug!(
        %date,
        canchas = canchas.len(),
        reservas = reservas.len(),
        pagos = pagos.len(),
        "agenda loaded"
    );
    Ok(build_agenda(date, &canchas, &reservas, &pagos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};
    use serde_json::Map;
    use tello_core::Capacity;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()
    }

    fn at(date: NaiveDate, h: u32) -> NaiveDateTime {
        date.and_hms_opt(h, 0, 0).unwrap()
    }

    fn cancha(id: i64, nombre: &str, local: i64) -> Cancha {
        Cancha {
            id,
            nombre: nombre.into(),
            local,
            cantidad: Some(Capacity::Fixed(5)),
        }
    }

    fn reserva(id: i64, cancha_id: i64, start: NaiveDateTime) -> Reserva {
        Reserva {
            id,
            cancha_id,
            hora_inicio: start,
            hora_fin: start + Duration::hours(1),
            nombre_reserva: format!("Cliente {id}"),
            celular_reserva: None,
            correo_reserva: None,
            precio: 20000,
            arbitro: false,
            confirmada: id % 2 == 0,
            reserva_fija_id: None,
            recordatorio_24h_enviado: None,
            comprobante: None,
        }
    }

    #[test]
    fn groups_by_site_then_field() {
        let canchas = vec![
            cancha(4, "Cancha B", 2),
            cancha(1, "Cancha B", 1),
            cancha(2, "Cancha A", 1),
            cancha(3, "Cancha A", 2),
        ];
        let reservas = vec![
            reserva(10, 1, at(day(), 20)),
            reserva(11, 1, at(day(), 8)),
            reserva(12, 3, at(day(), 9)),
            reserva(13, 3, at(day() + Duration::days(1), 9)),
        ];
        let pagos = vec![
            Pago { id: 1, reserva_id: 10, metadata: Map::new() },
            Pago { id: 2, reserva_id: 10, metadata: Map::new() },
        ];

        let agenda = build_agenda(day(), &canchas, &reservas, &pagos);
        assert_eq!(agenda.fecha, "2 de marzo de 2025");
        assert_eq!(agenda.sites.len(), 2);
        assert_eq!(agenda.sites[0].site, Site::Sabana);
        assert_eq!(agenda.sites[1].site, Site::Guadalupe);

        let sabana: Vec<i64> = agenda.sites[0].canchas.iter().map(|c| c.cancha_id).collect();
        assert_eq!(sabana, vec![2, 1]);

        let cancha_b = &agenda.sites[0].canchas[1];
        let ids: Vec<i64> = cancha_b.rows.iter().map(|r| r.reserva_id).collect();
        assert_eq!(ids, vec![11, 10]);
        assert_eq!(cancha_b.rows[1].pagos, 2);
        assert_eq!(cancha_b.rows[0].hora, "8:00 AM - 9:00 AM");

        // empty field keeps its slot, next-day booking is ignored
        assert!(agenda.sites[0].canchas[0].rows.is_empty());
        assert_eq!(agenda.sites[1].canchas[0].rows.len(), 1);
        assert_eq!(agenda.reserva_count(), 3);
    }

    #[test]
    fn unknown_field_gets_placeholder() {
        let agenda = build_agenda(day(), &[], &[reserva(5, 99, at(day(), 10))], &[]);
        assert_eq!(agenda.sites.len(), 1);
        assert_eq!(agenda.sites[0].canchas[0].nombre, "Cancha 99");
        assert_eq!(agenda.reserva_count(), 1);
    }
}
