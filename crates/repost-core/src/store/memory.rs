use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{store::KvStore, Result};

#[derive(Debug, Default)]
struct Tables {
    hashes: HashMap<String, HashMap<String, String>>,
    sets: HashMap<String, HashSet<String>>,
}

/// Process-local `KvStore`.
///
/// Mirrors Redis semantics where the relay depends on them: a set whose last member is
/// removed stops existing, so it no longer shows up in `keys_with_prefix`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut t = self.tables.write().await;
        t.hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        let t = self.tables.read().await;
        Ok(t.hashes.get(key).and_then(|h| h.get(field)).cloned())
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        let t = self.tables.read().await;
        Ok(t.hashes.get(key).cloned().unwrap_or_default())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<bool> {
        let mut t = self.tables.write().await;
        Ok(t.sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<bool> {
        let mut t = self.tables.write().await;
        let Some(set) = t.sets.get_mut(key) else {
            return Ok(false);
        };
        let removed = set.remove(member);
        if set.is_empty() {
            t.sets.remove(key);
        }
        Ok(removed)
    }

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool> {
        let t = self.tables.read().await;
        Ok(t.sets.get(key).is_some_and(|s| s.contains(member)))
    }

    async fn set_members(&self, key: &str) -> Result<HashSet<String>> {
        let t = self.tables.read().await;
        Ok(t.sets.get(key).cloned().unwrap_or_default())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let t = self.tables.read().await;
        Ok(t.hashes
            .keys()
            .chain(t.sets.keys())
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
