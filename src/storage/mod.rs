pub mod json;
pub mod memory;
pub mod minio;
pub mod parquet;
pub mod persister;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;
use crate::models::MarketSnapshot;

pub use json::JsonSnapshotStore;
pub use memory::MemorySnapshotStore;
pub use minio::MinioSnapshotStore;
pub use parquet::ReportExporter;
pub use persister::{spawn_persister, Persister};

/// Where the market state lives between runs.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<MarketSnapshot>>;

    async fn save(&self, snapshot: &MarketSnapshot) -> Result<()>;
}

/// Opens the backend named in the storage settings.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn SnapshotStore>> {
    let store: Arc<dyn SnapshotStore> = match config.backend {
        StorageBackend::Json => Arc::new(JsonSnapshotStore::new(&config.json_path)),
        StorageBackend::Minio => Arc::new(MinioSnapshotStore::new(&config.minio).await?),
        StorageBackend::Memory => Arc::new(MemorySnapshotStore::new()),
    };
    Ok(store)
}
