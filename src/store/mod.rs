//! Key-value storage that invite records live in.
//!
//! Values are opaque JSON strings. Besides plain get/set the trait offers two
//! conditional writes so callers never have to check-then-act.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value at `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Unconditional overwrite.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write only when `key` is absent. Returns whether the write happened.
    async fn insert_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError>;

    /// Write only when the current value at `key` equals `expected`.
    /// Returns whether the write happened.
    async fn replace_if(&self, key: &str, expected: &str, value: &str)
        -> Result<bool, StoreError>;
}
