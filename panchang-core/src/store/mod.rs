//! Pluggable key-value storage behind the cache and the credential store.
//!
//! Each store instance is one namespace. Values are opaque strings (JSON in
//! practice); callers own the encoding.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::PanchangResult;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PanchangResult<Option<String>>;

    /// Insert or overwrite.
    async fn put(&self, key: &str, value: String) -> PanchangResult<()>;

    /// Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> PanchangResult<()>;

    async fn clear(&self) -> PanchangResult<()>;
}
