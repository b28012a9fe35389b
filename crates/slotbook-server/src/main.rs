//! Composition root: config, adapters, engine, HTTP surface.

mod routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use slotbook_calendar::GoogleCalendar;
use slotbook_core::Config;
use slotbook_engine::Engine;
use slotbook_store::{SqliteTemplateStore, TemplateDb};

#[tokio::main]
async fn main() -> Result<()> {
    slotbook_core::init()?;

    let config_path =
        std::env::var("SLOTBOOK_CONFIG").unwrap_or_else(|_| "slotbook.toml".to_string());
    let (config, _validation) = Config::load_validated(&config_path)?;
    let zone = config.zone()?;

    let access_token = config
        .calendar
        .access_token
        .clone()
        .context("Calendar access token not configured (set SLOTBOOK_CALENDAR_TOKEN)")?;

    let store = SqliteTemplateStore::new(&config.store.path)
        .with_context(|| format!("Failed to open template store at {}", config.store.path))?;
    let templates = TemplateDb::new(store);

    let calendar = GoogleCalendar::new(
        &access_token,
        &config.calendar.identity,
        zone,
        Duration::from_secs(config.calendar.timeout_secs),
    )
    .context("Failed to build calendar client")?;

    let engine = Arc::new(Engine::new(
        Arc::new(templates),
        Arc::new(calendar),
        zone,
    ));

    let router = routes::router(engine);
    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    tracing::info!(addr = %config.listen_addr, zone = %zone, "serving");
    axum::serve(listener, router).await?;
    Ok(())
}
