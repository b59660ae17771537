//! feed-courier — Binary Entrypoint
//! Runs the feed → summary → webhook pipeline once and prints the report.
//! Intended to be scheduled (cron, systemd timer, CI schedule).

use anyhow::Result;
use feed_courier::telemetry::TextfileMetrics;
use feed_courier::{Config, Pipeline};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON lines when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("feed_courier=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Config::load()?;
    tracing::info!(
        feed = %cfg.feed_url,
        mode = %cfg.dry_run,
        max_fetch = cfg.max_fetch,
        max_age_hours = cfg.max_age_hours,
        state = %cfg.state_path.display(),
        webhook = cfg.webhook_url.is_some(),
        "config loaded"
    );

    let metrics = match cfg.metrics_textfile.clone() {
        Some(path) => Some(TextfileMetrics::install(path)?),
        None => None,
    };

    let pipeline = Pipeline::from_config(&cfg)?;
    let report = pipeline.run().await;
    println!("{report}");

    if let Some(m) = metrics {
        if let Err(e) = m.write().await {
            tracing::warn!(error = %format!("{e:#}"), "metrics textfile not written");
        }
    }
    Ok(())
}
