//! Redis adapter.
//!
//! Implements the `repost-core` `KvStore` port with hashes and sets. Every Redis error
//! becomes `Error::StoreUnavailable`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use repost_core::{errors::Error, store::KvStore, Result};

const SCAN_BATCH: usize = 200;

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to `url` (`redis://host:port/db`).
    ///
    /// The connection manager reconnects on its own after the initial connect.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_err)?;
        let conn = client.get_connection_manager().await.map_err(map_err)?;
        tracing::info!("connected to redis");
        Ok(Self { conn })
    }

    async fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T> {
        let mut conn = self.conn.clone();
        cmd.query_async::<T>(&mut conn).await.map_err(map_err)
    }

    pub async fn ping(&self) -> Result<()> {
        let reply: String = self.query(&redis::cmd("PING")).await?;
        if reply != "PONG" {
            return Err(Error::StoreUnavailable(format!(
                "unexpected PING reply: {reply}"
            )));
        }
        Ok(())
    }
}

fn map_err(e: redis::RedisError) -> Error {
    Error::StoreUnavailable(format!("redis error: {e}"))
}

/// Escape glob metacharacters so `prefix` matches literally in `SCAN MATCH`.
fn glob_prefix(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('*');
    out
}

#[async_trait]
impl KvStore for RedisStore {
    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let _: i64 = self
            .query(redis::cmd("HSET").arg(key).arg(field).arg(value))
            .await?;
        Ok(())
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        self.query(redis::cmd("HGET").arg(key).arg(field)).await
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        self.query(redis::cmd("HGETALL").arg(key)).await
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<bool> {
        let added: i64 = self
            .query(redis::cmd("SADD").arg(key).arg(member))
            .await?;
        Ok(added > 0)
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<bool> {
        let removed: i64 = self
            .query(redis::cmd("SREM").arg(key).arg(member))
            .await?;
        Ok(removed > 0)
    }

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool> {
        self.query(redis::cmd("SISMEMBER").arg(key).arg(member))
            .await
    }

    async fn set_members(&self, key: &str) -> Result<HashSet<String>> {
        self.query(redis::cmd("SMEMBERS").arg(key)).await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let pattern = glob_prefix(prefix);
        let mut cursor: u64 = 0;
        let mut keys = HashSet::new();

        // SCAN may return a key more than once; dedupe.
        loop {
            let (next, batch): (u64, Vec<String>) = self
                .query(
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH),
                )
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(keys.into_iter().collect())
    }
}
