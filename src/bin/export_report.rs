use anyhow::{bail, Result};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use agripresyo::config::Settings;
use agripresyo::storage::{open_store, ReportExporter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/inventory_report.parquet"));

    let settings = Settings::new()?;
    let store = open_store(&settings.storage).await?;

    let Some(snapshot) = store.load().await? else {
        bail!("no market snapshot found for the {:?} backend", settings.storage.backend);
    };

    info!(
        saved_at = %snapshot.saved_at,
        crops = snapshot.crops.len(),
        output = ?output,
        "Exporting inventory report"
    );
    let rows = ReportExporter::write_report(&snapshot, &output)?;
    info!(rows = rows, "Export complete");

    Ok(())
}
