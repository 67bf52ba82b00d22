use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    AdmissionController, ConcurrencyMode, DurableLocalStore, HttpAvailabilityChecker, SharedPage,
};
use shared::protocol::CALLSIGN_INPUT_ID;
use storage::normalize_database_url;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod report;

use config::load_settings;
use report::AdmissionReport;

/// Checks whether a callsign is free and prints the resulting page state.
#[derive(Parser, Debug)]
struct Args {
    /// Value of the callsign input; defaults to the last admitted callsign.
    #[arg(long)]
    callsign: Option<String>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long, default_value = "admit.toml")]
    config: PathBuf,
    /// Abort an earlier check still waiting when a new one starts.
    #[arg(long)]
    replace_pending: bool,
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(database_url) = args.database_url {
        settings.database_url = database_url;
    }
    if args.replace_pending {
        settings.concurrency = ConcurrencyMode::ReplacePending;
    }

    let database_url = normalize_database_url(&settings.database_url);
    let store = DurableLocalStore::open(&database_url, &settings.server_url)
        .await
        .with_context(|| format!("failed to open local store for '{}'", settings.server_url))?;
    info!(
        origin = store.origin(),
        %database_url,
        "admit: local store ready"
    );

    let page = SharedPage::default();
    let controller = AdmissionController::new(
        Arc::new(page.clone()),
        Arc::new(store),
        Arc::new(HttpAvailabilityChecker::new(settings.server_url.clone())),
    )
    .with_concurrency_mode(settings.concurrency);

    let input = match args.callsign {
        Some(value) => value,
        None => controller.remembered_callsign().await?.unwrap_or_default(),
    };
    page.set_input(CALLSIGN_INPUT_ID, input);

    let (callsign, outcome) = match controller.on_load().await {
        Some(pending) => {
            let callsign = pending.callsign().to_string();
            (Some(callsign), pending.outcome().await)
        }
        None => (None, None),
    };

    let report = AdmissionReport::new(callsign, outcome, &page.snapshot());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(())
}
