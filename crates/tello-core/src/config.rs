use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_TIMEZONE: &str = "America/Costa_Rica";
pub const DEFAULT_CONFIG_PATH: &str = "tello.toml";

/// Top-level config (tello.toml + TELLO_* env overrides).
///
/// Built once in `main` and handed to every component; nothing reads the
/// environment after startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelloConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub cron: CronConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Shared secret for the scheduled-job endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CronConfig {
    /// Expected `Authorization: Bearer <secret>` value.
    /// Empty means development mode: every request is accepted.
    #[serde(default)]
    pub secret: String,
}

/// External data store (Supabase / PostgREST).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Project URL without trailing slash, e.g. `https://xyz.supabase.co`.
    /// Empty selects the in-memory store (local development only).
    #[serde(default)]
    pub url: String,
    /// Server-side secret key (`sb_secret_...`); bypasses row-level security.
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// IANA timezone whose wall clock the stored timestamps use.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Public booking page; the reservation id is appended.
    #[serde(default = "default_reserva_base_url")]
    pub reserva_base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            reserva_base_url: default_reserva_base_url(),
        }
    }
}

impl SiteConfig {
    pub fn tz(&self) -> crate::error::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| crate::error::TelloError::UnknownTimezone(self.timezone.clone()))
    }

    pub fn reserva_url(&self, reserva_id: i64) -> String {
        format!(
            "{}/{}",
            self.reserva_base_url.trim_end_matches('/'),
            reserva_id
        )
    }
}

/// One outgoing mail account per business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Futbol Tello: confirmations, reminders, summaries, daily schedule.
    #[serde(default = "default_tellos_profile")]
    pub tellos: MailProfile,
    /// FC Pro Soccer Tryouts: applications and the plain greeting email.
    #[serde(default = "default_tryouts_profile")]
    pub tryouts: MailProfile,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            tellos: default_tellos_profile(),
            tryouts: default_tryouts_profile(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MailBackend {
    Smtp,
    /// Log and keep messages in memory instead of delivering them.
    #[default]
    Log,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SmtpSecurity {
    #[default]
    Starttls,
    /// Implicit TLS (usually port 465).
    Tls,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailProfile {
    #[serde(default)]
    pub backend: MailBackend,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub security: SmtpSecurity,
    /// Sender address, optionally with a display name.
    pub from: String,
}

impl MailProfile {
    fn log_only(from: &str) -> Self {
        Self {
            backend: MailBackend::Log,
            host: String::new(),
            port: default_smtp_port(),
            username: None,
            password: None,
            security: SmtpSecurity::default(),
            from: from.to_string(),
        }
    }
}

/// Internal recipients of notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Receive a notification for every tryout application.
    #[serde(default = "default_application_admins")]
    pub application_admins: Vec<String>,
    /// Receive the summary after each reminder run.
    #[serde(default = "default_admin_list")]
    pub summary_recipients: Vec<String>,
    /// Receive the daily schedule PDF.
    #[serde(default = "default_admin_list")]
    pub schedule_recipients: Vec<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            application_admins: default_application_admins(),
            summary_recipients: default_admin_list(),
            schedule_recipients: default_admin_list(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_reserva_base_url() -> String {
    "https://futboltello.com/reserva".to_string()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_tellos_profile() -> MailProfile {
    MailProfile::log_only("Futbol Tello <info@futboltello.com>")
}
fn default_tryouts_profile() -> MailProfile {
    MailProfile::log_only("info@fcprosoccertryouts.com")
}
fn default_admin_list() -> Vec<String> {
    vec!["aruiz@lobsterlabs.net".to_string()]
}
fn default_application_admins() -> Vec<String> {
    vec![
        "aruiz@lobsterlabs.net".to_string(),
        "jrodriguez@futbolconsultants.com".to_string(),
        "info@fcprosoccertryouts.com".to_string(),
        "arosales@futbolconsultants.com".to_string(),
    ]
}

impl TelloConfig {
    /// Load config from a TOML file with TELLO_* env var overrides.
    ///
    /// Nested keys use a double underscore: `TELLO_CRON__SECRET`,
    /// `TELLO_MAIL__TELLOS__PASSWORD`. A missing file is not an error;
    /// every section has defaults.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);

        let config: TelloConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("TELLO_").split("__"))
            .extract()
            .map_err(|e| crate::error::TelloError::Config(e.to_string()))?;

        // Fail at startup rather than on the first cron run.
        config.site.tz()?;
        Ok(config)
    }
}
