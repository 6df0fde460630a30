use std::sync::Arc;

use repost_core::{
    config::{Config, StoreBackend},
    store::{InMemoryStore, KvStore, TimeoutStore},
};
use repost_redis::RedisStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    repost_core::logging::init("repost")?;

    let cfg = Arc::new(Config::load()?);

    let backend: Arc<dyn KvStore> = match &cfg.store {
        StoreBackend::Redis { url } => {
            let store = tokio::time::timeout(cfg.store_timeout, RedisStore::connect(url))
                .await
                .map_err(|_| anyhow::anyhow!("timed out connecting to redis"))??;
            store.ping().await?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; subscriptions are lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };
    let store: Arc<dyn KvStore> = Arc::new(TimeoutStore::new(backend, cfg.store_timeout));

    repost_telegram::router::run(cfg, store).await
}
