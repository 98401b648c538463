use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agripresyo::api::{build_router, AppState};
use agripresyo::config::Settings;
use agripresyo::services::advisory::{run_advisory_feed, RandomAdvisories};
use agripresyo::services::seed::default_catalog;
use agripresyo::services::Market;
use agripresyo::storage::{open_store, spawn_persister};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;
    init_tracing(settings.logging.json);

    let store = open_store(&settings.storage).await?;
    let budget_limit = settings.market.budget_limit;

    let (market, seeded) = match store.load().await? {
        Some(snapshot) => {
            info!(crops = snapshot.crops.len(), saved_at = %snapshot.saved_at, "Restored market snapshot");
            (Market::from_snapshot(snapshot, budget_limit), false)
        }
        None => {
            let today = Utc::now().date_naive();
            let crops = default_catalog(settings.market.history_start, today, &mut rand::rng());
            info!(crops = crops.len(), "No snapshot found, starting from the seed catalog");
            (Market::new(crops, budget_limit), true)
        }
    };

    let (persister, persist_handle) = spawn_persister(store);
    if seeded {
        persister.publish(market.snapshot());
    }
    let market = market.into_shared();

    let advisories = settings.advisories.enabled.then(|| {
        let source = RandomAdvisories::new(settings.advisories.interval_ms, settings.advisories.jitter_ms);
        tokio::spawn(run_advisory_feed(source, market.clone()))
    });

    let app = build_router(AppState::new(market, persister.clone()));
    let listener = tokio::net::TcpListener::bind(&settings.server.bind).await?;
    info!(bind = %settings.server.bind, backend = ?settings.storage.backend, "Market service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = advisories {
        handle.abort();
    }
    drop(persister);
    persist_handle.await?;
    info!("Market service stopped");

    Ok(())
}
