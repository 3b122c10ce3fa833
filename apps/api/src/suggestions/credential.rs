//! Persisted Gemini credential (`gemini_api_key`).

use tracing::{info, warn};

use crate::storage::{KeyValueStore, StorageError, API_KEY_KEY};

/// The stored key, or `None` when absent or blank. Read failures are logged and
/// treated as absent.
pub async fn load_credential(storage: &dyn KeyValueStore) -> Option<String> {
    match storage.get(API_KEY_KEY).await {
        Ok(value) => value.filter(|k| !k.trim().is_empty()),
        Err(e) => {
            warn!("Could not read stored API key: {e}");
            None
        }
    }
}

pub async fn save_credential(storage: &dyn KeyValueStore, key: &str) -> Result<(), StorageError> {
    storage.set(API_KEY_KEY, key.trim()).await
}

/// Writes `env_key` when storage has no credential yet. Returns whether it did.
pub async fn seed_credential(
    storage: &dyn KeyValueStore,
    env_key: Option<&str>,
) -> Result<bool, StorageError> {
    let Some(key) = env_key.map(str::trim).filter(|k| !k.is_empty()) else {
        return Ok(false);
    };
    if load_credential(storage).await.is_some() {
        return Ok(false);
    }
    save_credential(storage, key).await?;
    info!("Seeded API key from GEMINI_API_KEY");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    #[tokio::test]
    async fn test_blank_credential_reads_as_missing() {
        let storage = MemoryStore::default();
        save_credential(&storage, "   ").await.unwrap();
        assert_eq!(load_credential(&storage).await, None);
    }

    #[tokio::test]
    async fn test_save_trims() {
        let storage = MemoryStore::default();
        save_credential(&storage, " abc \n").await.unwrap();
        assert_eq!(load_credential(&storage).await.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_seed_does_not_overwrite() {
        let storage = MemoryStore::default();
        assert!(seed_credential(&storage, Some("env-key")).await.unwrap());
        assert!(!seed_credential(&storage, Some("other")).await.unwrap());
        assert_eq!(load_credential(&storage).await.as_deref(), Some("env-key"));
    }

    #[tokio::test]
    async fn test_seed_without_env_is_noop() {
        let storage = MemoryStore::default();
        assert!(!seed_credential(&storage, None).await.unwrap());
        assert_eq!(load_credential(&storage).await, None);
    }
}
