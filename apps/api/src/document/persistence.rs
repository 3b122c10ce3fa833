//! Persistence subscriber: writes every published snapshot to durable storage.
//!
//! Decoupled from the store through the `watch` channel. Bursts of mutations are
//! coalesced; the last snapshot always wins.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::document::models::CvDocument;
use crate::document::restore::{restore_document, Restored};
use crate::storage::{KeyValueStore, StorageError, CV_DATA_KEY};

/// Reads `cvData` and rehydrates it. A storage read failure is treated like an
/// absent key.
pub async fn load_document(storage: &dyn KeyValueStore) -> Restored {
    let raw = match storage.get(CV_DATA_KEY).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                "Could not read stored CV data from {} storage: {e}",
                storage.backend()
            );
            None
        }
    };
    restore_document(raw.as_deref())
}

/// Serializes the full document under `cvData`.
pub async fn save_document(
    storage: &dyn KeyValueStore,
    doc: &CvDocument,
) -> Result<(), StorageError> {
    let text = serde_json::to_string(doc)?;
    storage.set(CV_DATA_KEY, &text).await
}

/// Spawns the background writer. Ends when every sender has been dropped.
pub fn spawn_persistence(
    mut rx: watch::Receiver<Arc<CvDocument>>,
    storage: Arc<dyn KeyValueStore>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            match save_document(storage.as_ref(), &snapshot).await {
                Ok(()) => debug!("CV document persisted"),
                Err(e) => error!("Failed to persist CV document: {e}"),
            }
        }
        debug!("Persistence task stopped");
    })
}

/// Waits for the writer to flush the last published snapshot. Call after every
/// `SharedStore` handle is gone, otherwise this only returns once `limit` expires.
pub async fn finish_persistence(task: JoinHandle<()>, limit: Duration) {
    match tokio::time::timeout(limit, task).await {
        Ok(Ok(())) => info!("Pending CV changes flushed to storage"),
        Ok(Err(e)) => error!("Persistence task failed during shutdown: {e}"),
        Err(_) => warn!("Persistence did not finish within {limit:?}; recent edits may be lost"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::PersonalField;
    use crate::document::restore::RestoreSource;
    use crate::document::shared::SharedStore;
    use crate::document::store::DocumentStore;
    use crate::storage::memory::MemoryStore;

    async fn wait_for_write(storage: &MemoryStore, needle: &str) -> String {
        for _ in 0..100 {
            if let Some(text) = storage.get(CV_DATA_KEY).await.unwrap() {
                if text.contains(needle) {
                    return text;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("snapshot containing {needle:?} was never persisted");
    }

    #[tokio::test]
    async fn test_load_from_empty_storage() {
        let storage = MemoryStore::default();
        let restored = load_document(&storage).await;
        assert_eq!(restored.source, RestoreSource::Empty);
    }

    #[tokio::test]
    async fn test_load_recovers_from_garbage() {
        let storage = MemoryStore::with_entry(CV_DATA_KEY, "}{");
        let restored = load_document(&storage).await;
        assert_eq!(restored.source, RestoreSource::Recovered);
    }

    #[tokio::test]
    async fn test_last_snapshot_flushed_when_store_dropped() {
        let storage = Arc::new(MemoryStore::default());
        let shared = SharedStore::new(DocumentStore::default());
        let task = spawn_persistence(shared.subscribe(), storage.clone());

        shared
            .mutate(|s| s.update_personal(PersonalField::Name, "Grace".into()))
            .await;
        drop(shared);
        finish_persistence(task, Duration::from_secs(5)).await;

        let stored = storage.get(CV_DATA_KEY).await.unwrap().unwrap();
        assert!(stored.contains("Grace"));
    }

    #[tokio::test]
    async fn test_mutations_are_persisted_and_reloadable() {
        let storage = Arc::new(MemoryStore::default());
        let shared = SharedStore::new(DocumentStore::default());
        let task = spawn_persistence(shared.subscribe(), storage.clone());

        shared
            .mutate(|s| s.update_personal(PersonalField::Email, "ada@example.com".into()))
            .await;
        wait_for_write(&storage, "ada@example.com").await;

        let restored = load_document(storage.as_ref()).await;
        assert_eq!(restored.source, RestoreSource::Stored);
        assert_eq!(restored.document.personal.email, "ada@example.com");

        drop(shared);
        task.await.unwrap();
    }
}
