use std::{collections::BTreeMap, sync::Arc};

use crate::{domain::ChatId, store::KvStore, Result};

/// Known conversations and their last seen titles.
///
/// Stored as a single hash: `<prefix>:known_groups` field = chat id, value = title.
pub struct GroupRegistry {
    store: Arc<dyn KvStore>,
    key: String,
}

impl GroupRegistry {
    pub fn new(store: Arc<dyn KvStore>, prefix: &str) -> Self {
        Self {
            store,
            key: format!("{prefix}:known_groups"),
        }
    }

    pub async fn register_or_update(&self, chat_id: ChatId, title: &str) -> Result<()> {
        self.store
            .hash_set(&self.key, &chat_id.0.to_string(), title)
            .await
    }

    /// Snapshot of every known chat, ordered by chat id.
    ///
    /// Fields that are not chat ids are skipped.
    pub async fn list_all(&self) -> Result<BTreeMap<ChatId, String>> {
        let raw = self.store.hash_get_all(&self.key).await?;
        Ok(raw
            .into_iter()
            .filter_map(|(id, title)| id.parse::<i64>().ok().map(|id| (ChatId(id), title)))
            .collect())
    }

    pub async fn title_of(&self, chat_id: ChatId) -> Result<Option<String>> {
        self.store.hash_get(&self.key, &chat_id.0.to_string()).await
    }
}
