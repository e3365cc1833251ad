use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use chrono_tz::Tz;
use tello_core::TelloConfig;
use tello_mail::{build_mailer, Mailer};
use tello_store::{MemoryStore, Repositories, SupabaseStore};
use tracing::{info, warn};

/// Central shared state, passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: TelloConfig,
    pub repos: Repositories,
    /// Futbol Tello sender: confirmations, reminders, summaries, schedule.
    pub tellos_mail: Arc<dyn Mailer>,
    /// FC Pro Soccer Tryouts sender: applications and greetings.
    pub tryouts_mail: Arc<dyn Mailer>,
    /// Site timezone, parsed once from `config.site.timezone`.
    pub tz: Tz,
}

impl AppState {
    /// Build the store and both mailers from config.
    pub fn from_config(config: TelloConfig) -> anyhow::Result<Self> {
        let repos = if config.store.url.trim().is_empty() {
            warn!("no store URL configured, using the in-memory store");
            Repositories::from_store(Arc::new(MemoryStore::new()))
        } else {
            info!(url = %config.store.url, "using Supabase store");
            Repositories::from_store(Arc::new(SupabaseStore::new(
                config.store.url.clone(),
                config.store.key.clone(),
            )))
        };
        let tellos_mail = build_mailer("tellos", &config.mail.tellos)?;
        let tryouts_mail = build_mailer("tryouts", &config.mail.tryouts)?;
        let tz = config.site.tz()?;
        Ok(Self {
            config,
            repos,
            tellos_mail,
            tryouts_mail,
            tz,
        })
    }

    /// Today's date at the site.
    pub fn today(&self) -> chrono::NaiveDate {
        self.now().date()
    }

    /// Site wall clock, the same representation as stored timestamps.
    pub fn now(&self) -> chrono::NaiveDateTime {
        tello_scheduler::wall_clock_now(self.tz)
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/greetings", get(crate::http::greetings::greetings_handler))
        .route(
            "/greetings-email",
            get(crate::http::greetings::greetings_email_handler),
        )
        .route(
            "/fcprosoccertryouts/submit-application",
            post(crate::http::applications::submit_application),
        )
        .route(
            "/tellos/confirm-reservation",
            post(crate::http::reservations::confirm_reservation),
        )
        .route(
            "/tellos/cron/send-24h-reminders",
            get(crate::http::cron::send_reminders),
        )
        .route(
            "/tellos/cron/materialize-recurring",
            get(crate::http::cron::materialize_recurring),
        )
        .route(
            "/tellos/cron/daily-schedule",
            get(crate::http::cron::daily_schedule),
        )
        .route(
            "/tellos/schedule.pdf",
            get(crate::http::schedule::schedule_pdf),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
