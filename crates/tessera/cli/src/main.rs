//! Tessera CLI - replay signed call scripts against a configured ledger
//!
//! Reads a TOML script of `[[calls]]`, applies each call in order and prints
//! one JSON line per call to stdout, optionally followed by the committed
//! event log. Logs go to stderr.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tessera_service::{TesseraConfig, TesseraLedger};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod script;

use script::{replay, select_events, Script};

/// Tessera CLI
#[derive(Parser)]
#[command(name = "tesseractl")]
#[command(about = "Replay signed call scripts against a Tessera ledger", long_about = None)]
#[command(version)]
struct Cli {
    /// Call script (TOML)
    script: PathBuf,

    /// Configuration file path
    #[arg(short, long, env = "TESSERA_CONFIG")]
    config: Option<String>,

    /// Controller identity, overriding the configuration
    #[arg(long)]
    controller: Option<String>,

    /// Log level, overriding the configuration
    #[arg(long, env = "TESSERA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "TESSERA_LOG_JSON")]
    json: bool,

    /// Print the committed event log after replay
    #[arg(long)]
    events: bool,

    /// Print only events with a sequence number greater than this
    #[arg(long, value_name = "SEQ")]
    events_since: Option<u64>,

    /// Stop at the first rejected call
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = TesseraConfig::load(cli.config.as_deref())?;
    if let Some(controller) = cli.controller.clone() {
        config = config.with_controller(controller);
    }

    init_tracing(
        cli.log_level.as_deref().unwrap_or(&config.logging.level),
        cli.json || config.logging.json,
    );

    let script = Script::load(&cli.script)?;
    let ledger = TesseraLedger::from_config(&config)?;
    info!(
        script = %cli.script.display(),
        calls = script.calls.len(),
        "Replaying call script"
    );

    let reports = replay(&ledger, &script, cli.strict)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for report in &reports {
        serde_json::to_writer(&mut out, report).context("Failed to write call report")?;
        writeln!(out)?;
    }
    for record in select_events(&ledger, cli.events, cli.events_since)? {
        serde_json::to_writer(&mut out, &record).context("Failed to write event")?;
        writeln!(out)?;
    }

    let rejected = reports.iter().filter(|r| !r.succeeded()).count();
    info!(
        applied = reports.len() - rejected,
        rejected,
        "Replay finished"
    );
    Ok(())
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
