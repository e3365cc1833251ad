//! Every email the backend sends: subject, text body and HTML template.

use askama::Template;
use serde::Serialize;
use tello_core::display::ReservationDisplay;

use crate::error::MailError;
use crate::message::{Attachment, Email};

// ── Futbol Tello: booking emails ────────────────────────────────────────────

#[derive(Template)]
#[template(path = "reservation_confirmation.html")]
struct ConfirmationHtml<'a> {
    r: &'a ReservationDisplay,
}

#[derive(Template)]
#[template(path = "reminder_24h.html")]
struct ReminderHtml<'a> {
    r: &'a ReservationDisplay,
}

/// Sent right after a booking is made.
pub fn reservation_confirmation(r: &ReservationDisplay) -> Result<Email, MailError> {
    let html = ConfirmationHtml { r }.render()?;

    let mut text = format!(
        "¡Reserva confirmada!\n\n\
         Hola {}, tu reserva ya está registrada.\n\n\
         {}\n",
        r.nombre_reserva,
        booking_lines(r),
    );
    if r.requires_sinpe() {
        text.push_str(
            "Importante: tienes 2 horas para realizar el SINPE y subir el comprobante.\n\
             Si no lo haces, tu reserva podría cancelarse automáticamente.\n",
        );
    } else {
        text.push_str("Pago: se realiza directamente en la cancha.\n");
    }
    text.push_str(&format!(
        "\nVer detalles de mi reserva: {}\n\nID de reserva: {}",
        r.reserva_url, r.reserva_id
    ));

    Ok(Email::new(
        vec![r.correo_reserva.clone()],
        "Futbol Tello: Reservación confirmada",
        text,
    )
    .with_html(html))
}

/// Sent once, roughly a day before the booking starts.
pub fn reminder_24h(r: &ReservationDisplay) -> Result<Email, MailError> {
    let html = ReminderHtml { r }.render()?;
    let text = format!(
        "Recordatorio de Reservación\n\n\
         Hola {}, te recordamos que tienes una reservación programada para mañana.\n\n\
         {}\n\
         Ver detalles de mi reserva: {}\n\n\
         ID de reserva: {}\n",
        r.nombre_reserva,
        booking_lines(r),
        r.reserva_url,
        r.reserva_id,
    );
    Ok(Email::new(
        vec![r.correo_reserva.clone()],
        format!("Recordatorio: Tu reserva es mañana - {}", r.cancha_nombre),
        text,
    )
    .with_html(html))
}

fn booking_lines(r: &ReservationDisplay) -> String {
    format!(
        "Cancha: {}\nLocal: {}\nFecha: {} — {}\nJugadores: {}\nÁrbitro: {}\nTotal: ₡{}\n",
        r.cancha_nombre, r.local_nombre, r.fecha, r.hora, r.jugadores, r.arbitro, r.precio_total
    )
}

// ── Futbol Tello: internal notifications ────────────────────────────────────

/// A reminder that went out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentReminder {
    pub reserva_id: i64,
    pub nombre: String,
    pub email: String,
    pub cancha: String,
    pub fecha: String,
    pub hora: String,
}

/// A reminder that could not be sent (or recorded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedReminder {
    pub reserva_id: i64,
    pub nombre: String,
    pub email: String,
    pub error: String,
}

#[derive(Template)]
#[template(path = "cron_summary.html")]
struct SummaryHtml<'a> {
    execution_time: &'a str,
    sent: &'a [SentReminder],
    failed: &'a [FailedReminder],
}

/// Summary of one reminder run, for the admins.
pub fn reminder_summary(
    recipients: &[String],
    execution_time: &str,
    sent: &[SentReminder],
    failed: &[FailedReminder],
) -> Result<Email, MailError> {
    let html = SummaryHtml {
        execution_time,
        sent,
        failed,
    }
    .render()?;

    let mut text = format!(
        "Resumen de Recordatorios 24h\nEjecutado: {}\n\nEmails Enviados: {}\nErrores: {}\n\n",
        execution_time,
        sent.len(),
        failed.len()
    );
    if !sent.is_empty() {
        text.push_str("ENVIADOS CORRECTAMENTE:\n");
        for item in sent {
            text.push_str(&format!(
                "- Reserva #{} - {} ({})\n",
                item.reserva_id, item.nombre, item.email
            ));
        }
        text.push('\n');
    }
    if !failed.is_empty() {
        text.push_str("ERRORES:\n");
        for item in failed {
            text.push_str(&format!(
                "- Reserva #{} - {} ({}): {}\n",
                item.reserva_id, item.nombre, item.email, item.error
            ));
        }
    }

    Ok(Email::new(
        recipients.to_vec(),
        format!(
            "[Cron] Recordatorios 24h: {} enviados, {} errores",
            sent.len(),
            failed.len()
        ),
        text,
    )
    .with_html(html))
}

#[derive(Template)]
#[template(path = "daily_schedule.html")]
struct DailyScheduleHtml<'a> {
    fecha: &'a str,
    reservas: usize,
}

/// Daily agenda with the PDF attached.
pub fn daily_schedule(
    recipients: &[String],
    fecha: &str,
    reservas: usize,
    filename: &str,
    pdf: Vec<u8>,
) -> Result<Email, MailError> {
    let html = DailyScheduleHtml { fecha, reservas }.render()?;
    let text = format!(
        "Agenda del {fecha}\n\nReservas del día: {reservas}\n\nEl detalle por local y cancha va en el PDF adjunto.\n"
    );
    Ok(Email::new(
        recipients.to_vec(),
        format!("Agenda Futbol Tello - {fecha}"),
        text,
    )
    .with_html(html)
    .with_attachment(Attachment::pdf(filename, pdf)))
}

// ── FC Pro Soccer Tryouts ───────────────────────────────────────────────────

/// A tryout application as shown in emails. Optional fields already carry
/// their "Not provided" placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub country: String,
    pub team: String,
    pub program: String,
    pub highlights: String,
}

#[derive(Template)]
#[template(path = "application_confirmation.html")]
struct ApplicationConfirmationHtml<'a> {
    name: &'a str,
}

#[derive(Template)]
#[template(path = "admin_notification.html")]
struct AdminNotificationHtml<'a> {
    app: &'a Application,
    timestamp: &'a str,
}

/// Acknowledgement to the applicant.
pub fn application_confirmation(app: &Application) -> Result<Email, MailError> {
    let html = ApplicationConfirmationHtml { name: &app.name }.render()?;
    let text = format!(
        "Hello {},\n\nWe received your application and we'll contact you soon.\n\n\
         Thank you for your interest!\n\nBest regards,\nFC Pro Soccer Tryouts",
        app.name
    );
    Ok(Email::new(
        vec![app.email.clone()],
        "Application Received - We'll Contact You Soon",
        text,
    )
    .with_html(html))
}

/// Notification to the tryout staff. `timestamp` is preformatted by the caller.
pub fn application_admin_notification(
    admins: &[String],
    app: &Application,
    timestamp: &str,
) -> Result<Email, MailError> {
    let html = AdminNotificationHtml { app, timestamp }.render()?;
    let text = format!(
        "NEW APPLICATION RECEIVED\n\n\
         Name: {}\nEmail: {}\nPhone: {}\nAge: {}\nCountry: {}\nTeam: {}\nProgram: {}\nHighlights: {}\n\n\
         Received on: {}\n\n\
         Please review and contact the applicant as soon as possible.\n",
        app.name,
        app.email,
        app.phone,
        app.age,
        app.country,
        app.team,
        app.program,
        app.highlights,
        timestamp
    );
    Ok(Email::new(
        admins.to_vec(),
        format!("🚨 New Application: {} - {}", app.name, app.program),
        text,
    )
    .with_html(html))
}

/// Plain text message from the greetings endpoint.
pub fn greeting(to: &str, message: &str) -> Email {
    Email::new(vec![to.to_string()], "Hello from API", message)
}
