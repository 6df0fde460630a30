use std::{collections::HashSet, sync::Arc};

use crate::{domain::ChatId, errors::Error, store::KvStore, Result};

/// Source → target subscription edges.
///
/// One set per target: `<prefix>:target_sources:<target>` holds the source chat ids
/// whose messages are copied into that target.
pub struct SubscriptionStore {
    store: Arc<dyn KvStore>,
    key_prefix: String,
}

impl SubscriptionStore {
    pub fn new(store: Arc<dyn KvStore>, prefix: &str) -> Self {
        Self {
            store,
            key_prefix: format!("{prefix}:target_sources:"),
        }
    }

    fn key(&self, target: ChatId) -> String {
        format!("{}{}", self.key_prefix, target.0)
    }

    /// Flip the `(target, source)` edge and return whether it is now active.
    ///
    /// The store arbitrates: the add is attempted first and only when the member was
    /// already present is it removed, so no read precedes the write.
    pub async fn toggle(&self, target: ChatId, source: ChatId) -> Result<bool> {
        if target == source {
            return Err(Error::SelfSubscription(target.0));
        }
        let key = self.key(target);
        let member = source.0.to_string();

        if self.store.set_add(&key, &member).await? {
            return Ok(true);
        }
        self.store.set_remove(&key, &member).await?;
        Ok(false)
    }

    pub async fn sources_of(&self, target: ChatId) -> Result<HashSet<ChatId>> {
        let members = self.store.set_members(&self.key(target)).await?;
        Ok(members
            .into_iter()
            .filter_map(|m| m.parse::<i64>().ok().map(ChatId))
            .collect())
    }

    /// Every target that lists `source` among its sources.
    ///
    /// Scans all target keys; the number of targets is expected to stay small.
    pub async fn targets_of(&self, source: ChatId) -> Result<Vec<ChatId>> {
        let member = source.0.to_string();
        let keys = self.store.keys_with_prefix(&self.key_prefix).await?;

        let mut targets = Vec::new();
        for key in keys {
            let Some(target) = key
                .strip_prefix(&self.key_prefix)
                .and_then(|id| id.parse::<i64>().ok())
            else {
                continue;
            };
            if self.store.set_is_member(&key, &member).await? {
                targets.push(ChatId(target));
            }
        }
        targets.sort();
        Ok(targets)
    }
}
