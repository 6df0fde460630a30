use std::{
    collections::{HashMap, HashSet},
    future::Future,
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;

use crate::{errors::Error, store::KvStore, Result};

/// `KvStore` decorator that bounds every call.
///
/// An elapsed call is reported as `StoreUnavailable`, same as a connection failure.
pub struct TimeoutStore {
    inner: Arc<dyn KvStore>,
    limit: Duration,
}

impl TimeoutStore {
    pub fn new(inner: Arc<dyn KvStore>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T>(&self, op: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.limit, fut).await {
            Ok(res) => res,
            Err(_) => Err(Error::StoreUnavailable(format!(
                "{op} timed out after {}ms",
                self.limit.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl KvStore for TimeoutStore {
    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()> {
        self.bounded("hash_set", self.inner.hash_set(key, field, value))
            .await
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        self.bounded("hash_get", self.inner.hash_get(key, field)).await
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        self.bounded("hash_get_all", self.inner.hash_get_all(key))
            .await
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<bool> {
        self.bounded("set_add", self.inner.set_add(key, member)).await
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<bool> {
        self.bounded("set_remove", self.inner.set_remove(key, member))
            .await
    }

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool> {
        self.bounded("set_is_member", self.inner.set_is_member(key, member))
            .await
    }

    async fn set_members(&self, key: &str) -> Result<HashSet<String>> {
        self.bounded("set_members", self.inner.set_members(key))
            .await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.bounded("keys_with_prefix", self.inner.keys_with_prefix(prefix))
            .await
    }
}
