use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tello_core::config::SiteConfig;
use tello_core::display::ReservationDisplay;
use tello_core::timefmt::format_timestamp;
use tello_core::{Cancha, Reserva};
use tello_mail::compose::{self, FailedReminder, SentReminder};
use tello_mail::{deliver, MailConnection, Mailer};
use tello_store::Repositories;
use tracing::{info, warn};

use crate::error::Result;

/// Bookings starting in `[from, to]`, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl ReminderWindow {
    /// The next 24 hours, starting at `now`.
    pub fn ahead_of(now: NaiveDateTime) -> Self {
        Self {
            from: now,
            to: now + Duration::hours(24),
        }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.from && at <= self.to
    }
}

/// Outcome of one reminder run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReminderReport {
    /// Bookings selected for a reminder.
    pub checked: usize,
    pub sent: Vec<SentReminder>,
    pub failed: Vec<FailedReminder>,
    pub summary_sent: bool,
}

impl ReminderReport {
    pub fn emails_sent(&self) -> usize {
        self.sent.len()
    }

    pub fn emails_failed(&self) -> usize {
        self.failed.len()
    }
}

/// Send the 24-hour reminder to every booking that needs one, then one
/// summary to `summary_recipients`.
///
/// `now` is the site's wall clock; it is also the value written to
/// `recordatorio_24h_enviado`. One mail connection is used for the whole
/// batch and closed at the end. Failing to load the batch or to open the
/// connection aborts the run; everything else is recorded per booking.
pub async fn send_due_reminders(
    repos: &Repositories,
    mailer: &dyn Mailer,
    site: &SiteConfig,
    summary_recipients: &[String],
    now: NaiveDateTime,
) -> Result<ReminderReport> {
    let window = ReminderWindow::ahead_of(now);
    let reservas = repos
        .reservas
        .pending_reminders(window.from, window.to)
        .await?;
    info!(from = %window.from, to = %window.to, count = reservas.len(), "reminder batch loaded");

    if reservas.is_empty() {
        return Ok(ReminderReport::default());
    }

    let mut ids: Vec<i64> = reservas.iter().map(|r| r.cancha_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let canchas: HashMap<i64, Cancha> = repos
        .canchas
        .canchas_by_ids(&ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let mut conn = mailer.connect().await?;
    let mut report = ReminderReport {
        checked: reservas.len(),
        ..Default::default()
    };

    for reserva in &reservas {
        match remind_one(repos, conn.as_mut(), site, &canchas, reserva, now).await {
            Ok(sent) => report.sent.push(sent),
            Err(error) => {
                warn!(reserva_id = reserva.id, %error, "reminder not delivered");
                report.failed.push(FailedReminder {
                    reserva_id: reserva.id,
                    nombre: reserva.nombre_reserva.clone(),
                    email: reserva.correo_reserva.clone().unwrap_or_default(),
                    error,
                });
            }
        }
    }

    report.summary_sent = send_summary(conn.as_mut(), summary_recipients, now, &report).await;

    if let Err(e) = conn.close().await {
        warn!(mailer = mailer.name(), error = %e, "closing mail connection failed");
    }

    info!(
        sent = report.emails_sent(),
        failed = report.emails_failed(),
        summary_sent = report.summary_sent,
        "reminder run finished"
    );
    Ok(report)
}

/// One booking: render, send, stamp. The error string ends up in the summary.
async fn remind_one(
    repos: &Repositories,
    conn: &mut dyn MailConnection,
    site: &SiteConfig,
    canchas: &HashMap<i64, Cancha>,
    reserva: &Reserva,
    now: NaiveDateTime,
) -> std::result::Result<SentReminder, String> {
    let cancha = canchas
        .get(&reserva.cancha_id)
        .ok_or_else(|| format!("Cancha {} not found", reserva.cancha_id))?;
    if reserva
        .correo_reserva
        .as_deref()
        .map_or(true, |e| e.trim().is_empty())
    {
        return Err("Reserva sin correo".to_string());
    }

    let booking = ReservationDisplay::from_records(reserva, cancha, site.reserva_url(reserva.id));
    let email = compose::reminder_24h(&booking).map_err(|e| e.to_string())?;

    let outcome = deliver(conn, &email).await;
    if let Some(error) = outcome.error {
        return Err(error);
    }

    repos
        .reservas
        .mark_reminder_sent(reserva.id, now)
        .await
        .map_err(|e| format!("reminder sent but not recorded: {e}"))?;

    Ok(SentReminder {
        reserva_id: reserva.id,
        nombre: booking.nombre_reserva,
        email: booking.correo_reserva,
        cancha: booking.cancha_nombre,
        fecha: booking.fecha,
        hora: booking.hora,
    })
}

async fn send_summary(
    conn: &mut dyn MailConnection,
    recipients: &[String],
    now: NaiveDateTime,
    report: &ReminderReport,
) -> bool {
    if recipients.is_empty() {
        warn!("no summary recipients configured");
        return false;
    }
    let email = match compose::reminder_summary(
        recipients,
        &format_timestamp(&now),
        &report.sent,
        &report.failed,
    ) {
        Ok(email) => email,
        Err(e) => {
            warn!(error = %e, "could not render reminder summary");
            return false;
        }
    };
    deliver(conn, &email).await.sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let window = ReminderWindow::ahead_of(now);
        assert!(window.contains(now));
        assert!(window.contains(now + Duration::hours(24)));
        assert!(!window.contains(now + Duration::hours(24) + Duration::seconds(1)));
        assert!(!window.contains(now - Duration::seconds(1)));
    }
}
