//! Fetches one random user and prints it, or prints the error message the
//! app would show in an alert.
//!
//! Usage: `netroute-demo [user|status|compatibility]` (default `user`).
//! Configuration comes from `Config.json` or `NETROUTE_CONFIG`, with
//! `NETROUTE_API_KEY` / `NETROUTE_BASE_URL` overrides; a `.env` file is
//! loaded first.

use std::process::ExitCode;

use anyhow::Context;
use dotenvy::dotenv;
use netroute_core::routes::{general, users};
use netroute_core::{ApiConfig, NetworkError, NetworkService};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_logging();

    let config = ApiConfig::load_default().context("invalid configuration")?;
    info!(
        environment = ?config.environment(),
        base_url = config.base_url(),
        api_version = config.api_version(),
        timeout_ms = config.timeout().as_millis() as u64,
        "configuration loaded"
    );
    let service = NetworkService::new(config).context("cannot start network service")?;

    let command = std::env::args().nth(1).unwrap_or_else(|| "user".to_string());
    let outcome = match command.as_str() {
        "user" => show_user(&service).await,
        "status" => general::get_status(&service).await.map(|doc| print_json(&doc)),
        "compatibility" => general::get_compatibility(&service).await.map(|doc| print_json(&doc)),
        other => anyhow::bail!("unknown command `{other}` (expected user, status or compatibility)"),
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("Warning: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn show_user(service: &NetworkService) -> Result<(), NetworkError> {
    let user = users::get_user(service).await?;
    match user.first() {
        Some(profile) => {
            println!("{}", profile.name.display_name());
            println!("{}", profile.picture.large);
        }
        None => info!("no users returned"),
    }
    Ok(())
}

fn print_json(doc: &serde_json::Value) {
    match serde_json::to_string_pretty(doc) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{doc}"),
    }
}
