use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tello_core::timefmt::parse_date;
use tello_core::TelloConfig;
use tracing::info;

mod app;
mod auth;
mod http;
mod jobs;

/// Futbol Tello booking backend: HTTP endpoints and scheduled jobs.
#[derive(Parser, Debug)]
#[command(name = "tello-gateway", version, about, long_about = None)]
struct Cli {
    /// Config file (default: $TELLO_CONFIG, then ./tello.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Send the 24-hour reminders once and exit
    Remind,
    /// Materialize recurring bookings once and exit
    Materialize,
    /// Email the daily schedule PDF once and exit
    Schedule {
        /// Day to render, YYYY-MM-DD (default: today at the site)
        #[arg(long)]
        date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tello_gateway=info,tello_scheduler=info,tello_mail=info,tower_http=debug".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // explicit flag > TELLO_CONFIG env > ./tello.toml
    let config_path = cli.config.or_else(|| std::env::var("TELLO_CONFIG").ok());
    let config = TelloConfig::load(config_path.as_deref()).context("loading config")?;
    let state = Arc::new(app::AppState::from_config(config)?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(state).await,
        Command::Remind => {
            let report = jobs::run_reminders(&state).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Materialize => {
            let report = jobs::run_materialize(&state).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Schedule { date } => {
            let date = match date {
                Some(raw) => parse_date(&raw)?,
                None => state.today(),
            };
            let report = jobs::run_daily_schedule(&state, date).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

async fn serve(state: Arc<app::AppState>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.config.gateway.bind, state.config.gateway.port)
        .parse()
        .context("invalid bind address")?;
    let router = app::build_router(state);

    info!("Tello gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
