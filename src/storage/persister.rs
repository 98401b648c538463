use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::SnapshotStore;
use crate::models::MarketSnapshot;

/// Hands snapshots to the background save task without waiting on I/O.
///
/// Only the newest unsaved snapshot is kept; a burst of mutations collapses
/// into a single save of the latest state.
#[derive(Clone)]
pub struct Persister {
    tx: Arc<watch::Sender<Option<MarketSnapshot>>>,
}

impl Persister {
    pub fn publish(&self, snapshot: MarketSnapshot) {
        self.tx.send_replace(Some(snapshot));
    }
}

/// Starts the save loop. It ends after every `Persister` clone is dropped and
/// the last published snapshot has been written.
pub fn spawn_persister(store: Arc<dyn SnapshotStore>) -> (Persister, JoinHandle<()>) {
    let (tx, mut rx) = watch::channel::<Option<MarketSnapshot>>(None);

    let handle = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let pending = rx.borrow_and_update().clone();
            let Some(snapshot) = pending else { continue };

            match store.save(&snapshot).await {
                Ok(()) => debug!(saved_at = %snapshot.saved_at, "Market snapshot persisted"),
                Err(e) => error!(error = %e, "Failed to persist market snapshot"),
            }
        }
        debug!("Persister stopped");
    });

    (Persister { tx: Arc::new(tx) }, handle)
}
