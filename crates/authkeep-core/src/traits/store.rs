//! Key-value storage trait.

use async_trait::async_trait;

use crate::error::StorageError;

/// An async key-value persistence backend.
///
/// Reads distinguish a missing key (`Ok(None)`) from a failed lookup
/// (`Err(_)`). Writes are assumed atomic per key, never across keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
