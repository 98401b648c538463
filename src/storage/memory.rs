use async_trait::async_trait;
use tokio::sync::Mutex;

use super::SnapshotStore;
use crate::error::Result;
use crate::models::MarketSnapshot;

/// Keeps the last saved snapshot in process memory.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshot: Mutex<Option<MarketSnapshot>>,
    saves: std::sync::atomic::AtomicU64,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: MarketSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    pub fn save_count(&self) -> u64 {
        self.saves.load(std::sync::atomic::Ordering::Relaxed)
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Result<Option<MarketSnapshot>> {
        Ok(self.snapshot.lock().await.clone())
    }

    async fn save(&self, snapshot: &MarketSnapshot) -> Result<()> {
        *self.snapshot.lock().await = Some(snapshot.clone());
        self.saves.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Ok(())
    }
}
