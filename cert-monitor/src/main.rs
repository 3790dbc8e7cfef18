use anyhow::Context;
use cert_monitor::config::{self, DEFAULT_SETTINGS_PATH, DEFAULT_SOURCES_PATH};
use cert_monitor::{Monitor, NotifierMux};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Watch certification feeds and announcement pages for updates.
#[derive(Parser, Debug)]
#[command(name = "cert-monitor", version, about)]
struct Cli {
    /// Feeds and pages to check
    #[arg(long, default_value = DEFAULT_SOURCES_PATH)]
    sources: PathBuf,

    /// Lookback window, filters, HTTP and notification settings
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,

    /// Log the digest instead of sending notifications
    #[arg(long)]
    dry_run: bool,

    /// Print the ranked updates as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let sources = config::load_sources(&cli.sources)
        .with_context(|| format!("loading sources from {}", cli.sources.display()))?;
    let settings = config::load_settings(&cli.settings)
        .with_context(|| format!("loading settings from {}", cli.settings.display()))?;

    let monitor = Monitor::from_settings(settings).context("building HTTP client")?;
    let notifier = if cli.dry_run {
        NotifierMux::log_only()
    } else {
        NotifierMux::from_settings(&monitor.settings().notification, monitor.fetcher())
    };

    if sources.is_empty() {
        warn!("No sources configured in {}", cli.sources.display());
    }
    info!(channels = ?notifier.names(), "Starting cert-monitor");

    let report = monitor.run(&sources, &notifier).await?;

    info!(
        checked = report.sources_checked,
        failed = report.sources_failed,
        collected = report.raw_items,
        updates = report.items.len(),
        elapsed_ms = (chrono::Utc::now() - report.started_at).num_milliseconds(),
        "Scan finished"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.items)?);
    }
    Ok(())
}
