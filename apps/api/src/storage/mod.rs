//! Durable key-value storage for the three well-known records.
//!
//! Every module that persists anything goes through `KeyValueStore`; nothing else
//! touches the filesystem or Redis directly. `AppState` carries an
//! `Arc<dyn KeyValueStore>` chosen at startup (Redis when `REDIS_URL` is set,
//! otherwise a directory of files).

use async_trait::async_trait;
use thiserror::Error;

pub mod file;
#[cfg(test)]
pub mod memory;
pub mod redis_store;

pub use file::FileStore;
pub use redis_store::RedisStore;

/// Serialized `CvDocument`.
pub const CV_DATA_KEY: &str = "cvData";
/// `"true"` once the intro has been shown.
pub const INTRO_SEEN_KEY: &str = "hasSeenIntro";
/// Credential for the text-generation endpoint.
pub const API_KEY_KEY: &str = "gemini_api_key";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Human-readable backend name for logs.
    fn backend(&self) -> &'static str;
}
