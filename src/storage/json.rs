use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::File as TokioFile;
use tokio::io::{AsyncWriteExt, BufWriter as TokioBufWriter};
use tracing::debug;

use super::SnapshotStore;
use crate::error::Result;
use crate::models::MarketSnapshot;

/// Pretty-printed JSON snapshot on the local filesystem.
///
/// Saves go to a sibling `.tmp` file that is renamed over the target, so a
/// crash mid-write never leaves a truncated snapshot behind.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    async fn load(&self) -> Result<Option<MarketSnapshot>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "No snapshot file yet");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: MarketSnapshot = serde_json::from_slice(&bytes)?;
        debug!(path = ?self.path, crops = snapshot.crops.len(), "Snapshot loaded");
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &MarketSnapshot) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let temp = self.temp_path();
        let file = TokioFile::create(&temp).await?;
        let mut writer = TokioBufWriter::new(file);
        writer.write_all(&serde_json::to_vec_pretty(snapshot)?).await?;
        writer.flush().await?;
        writer.into_inner().sync_all().await?;

        tokio::fs::rename(&temp, &self.path).await?;
        debug!(path = ?self.path, "Snapshot saved");
        Ok(())
    }
}
