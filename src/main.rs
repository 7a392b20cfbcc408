//! War-o-meter — binary entrypoint.
//! Loads configuration, starts the polling scheduler and serves the gauge
//! reading over HTTP.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use war_o_meter::{
    api::{self, AppState},
    metrics::Metrics,
    spawn_scheduler, Aggregator, MeterConfig,
};

/// Compact logs by default; `METER_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("war_o_meter=info,meter=info,warn"));

    let json = std::env::var("METER_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = MeterConfig::from_env().context("loading meter configuration")?;
    tracing::info!(
        feeds = cfg.feeds.len(),
        primary_keywords = cfg.keywords.primary.len(),
        secondary_keywords = cfg.keywords.secondary.len(),
        interval_secs = cfg.interval.as_secs(),
        fetch_timeout_secs = cfg.fetch_timeout.as_secs(),
        strategy = ?cfg.strategy,
        "configuration loaded"
    );

    let metrics = Metrics::init(cfg.interval)?;

    let state = AppState::new(Aggregator::from_config(&cfg));
    let scheduler = spawn_scheduler(state.runner.clone(), cfg.interval);

    let app = api::router(state).merge(metrics.router());
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "http listening");

    axum::serve(listener, app).await.context("http server")?;
    scheduler.abort();
    Ok(())
}
