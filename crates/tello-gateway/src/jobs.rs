//! The three batch jobs, shared by the cron endpoints and the CLI.

use chrono::NaiveDate;
use serde::Serialize;
use tello_agenda::{file_name, load_agenda, render_pdf, AgendaError};
use tello_mail::compose;
use tello_scheduler::{
    materialize, send_due_reminders, MaterializeReport, ReminderReport, SchedulerError,
};
use tracing::{info, warn};

use crate::app::AppState;
use crate::http::send_composed;

pub async fn run_reminders(state: &AppState) -> Result<ReminderReport, SchedulerError> {
    send_due_reminders(
        &state.repos,
        state.tellos_mail.as_ref(),
        &state.config.site,
        &state.config.notify.summary_recipients,
        state.now(),
    )
    .await
}

pub async fn run_materialize(state: &AppState) -> Result<MaterializeReport, SchedulerError> {
    materialize(&state.repos, state.today()).await
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReport {
    pub date: NaiveDate,
    pub fecha: String,
    pub reservas: usize,
    pub email_sent: bool,
}

/// Render the agenda for `date` and email it to the schedule recipients.
pub async fn run_daily_schedule(
    state: &AppState,
    date: NaiveDate,
) -> Result<ScheduleReport, AgendaError> {
    let agenda = load_agenda(&state.repos, date).await?;
    let pdf = render_pdf(&agenda)?;
    let reservas = agenda.reserva_count();
    info!(%date, reservas, bytes = pdf.len(), "daily schedule rendered");

    let recipients = &state.config.notify.schedule_recipients;
    let email_sent = if recipients.is_empty() {
        warn!("no schedule recipients configured");
        false
    } else {
        let email = compose::daily_schedule(
            recipients,
            &agenda.fecha,
            reservas,
            &file_name(&agenda),
            pdf,
        );
        send_composed(state.tellos_mail.as_ref(), email).await.sent
    };

    Ok(ScheduleReport {
        date,
        fecha: agenda.fecha,
        reservas,
        email_sent,
    })
}
