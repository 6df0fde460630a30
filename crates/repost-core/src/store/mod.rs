//! Key-value persistence port.
//!
//! The relay only needs hash-map and set primitives; Redis is the production backend
//! (`repost-redis`), the in-memory store backs tests and `REPOST_STORE=memory`.

pub mod memory;
pub mod timeout;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::Result;

pub use memory::InMemoryStore;
pub use timeout::TimeoutStore;

/// Hexagonal port for the key-value store.
///
/// Every failure must surface as `Error::StoreUnavailable`; implementations never turn
/// an outage into an empty answer.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()>;
    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>>;
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>>;

    /// Returns true when `member` was not present before.
    async fn set_add(&self, key: &str, member: &str) -> Result<bool>;
    /// Returns true when `member` was present before.
    async fn set_remove(&self, key: &str, member: &str) -> Result<bool>;
    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool>;
    async fn set_members(&self, key: &str) -> Result<HashSet<String>>;

    /// Every existing key starting with `prefix`. Empty sets do not exist.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
