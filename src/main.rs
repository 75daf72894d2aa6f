//! alertdeck - the alert monitoring core of an admin dashboard.
//!
//! # API Endpoints
//!
//! - `GET /alerts` - The alerts view (time window, filters, drawer selection)
//! - `GET /alerts/:id` - A single alert
//! - `PATCH /alerts/:id` - Edit an alert
//! - `GET /time-window` - Resolve a time preset
//! - `GET /health` - Health check

use chrono::Utc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use alertdeck::api::AppState;
use alertdeck::build_router;
use alertdeck::config::Config;
use alertdeck::storage::AlertStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("alertdeck=info".parse()?))
        .init();

    let config = Config::from_env();
    info!(?config, "Starting alertdeck server");

    let store = if config.seed_demo {
        AlertStore::seeded(Utc::now(), config.latency)
    } else {
        AlertStore::new(Vec::new(), config.latency)
    };
    info!(alerts = store.alert_count().await, "Alert store initialized");

    let app = build_router(AppState::new(store));

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "alertdeck is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
