use std::sync::Arc;

use futures::future::join_all;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::port::MessagingPort,
    subscriptions::SubscriptionStore,
    Result,
};

/// Outcome of fanning one message out to its subscribers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

pub struct ForwardDispatcher {
    subscriptions: Arc<SubscriptionStore>,
    messenger: Arc<dyn MessagingPort>,
}

impl ForwardDispatcher {
    pub fn new(subscriptions: Arc<SubscriptionStore>, messenger: Arc<dyn MessagingPort>) -> Self {
        Self {
            subscriptions,
            messenger,
        }
    }

    /// Targets subscribed to `source`, never `source` itself.
    pub async fn destinations_for(&self, source: ChatId) -> Result<Vec<ChatId>> {
        let mut targets = self.subscriptions.targets_of(source).await?;
        targets.retain(|t| *t != source);
        Ok(targets)
    }

    /// Forward `message` to every destination of its chat.
    ///
    /// Forwards run concurrently; a failed destination is logged and counted without
    /// affecting the others. Only the destination lookup can fail the whole call.
    pub async fn dispatch(&self, message: MessageRef) -> Result<DispatchReport> {
        let destinations = self.destinations_for(message.chat_id).await?;
        if destinations.is_empty() {
            return Ok(DispatchReport::default());
        }

        let attempts = destinations.iter().map(|&dest| async move {
            let res = self.messenger.forward_message(dest, message).await;
            if let Err(e) = &res {
                tracing::warn!(
                    source_chat = message.chat_id.0,
                    target_chat = dest.0,
                    message_id = message.message_id.0,
                    error = %e,
                    "forward failed"
                );
            }
            res.is_ok()
        });
        let results = join_all(attempts).await;

        let delivered = results.iter().filter(|ok| **ok).count();
        let report = DispatchReport {
            attempted: results.len(),
            delivered,
            failed: results.len() - delivered,
        };
        tracing::debug!(
            source_chat = message.chat_id.0,
            attempted = report.attempted,
            delivered = report.delivered,
            "dispatched"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::MessageId,
        store::{InMemoryStore, KvStore},
        testing::FakeMessenger,
    };

    fn msg(chat: i64) -> MessageRef {
        MessageRef {
            chat_id: ChatId(chat),
            message_id: MessageId(42),
        }
    }

    async fn setup(
        messenger: Arc<FakeMessenger>,
    ) -> (Arc<dyn KvStore>, Arc<SubscriptionStore>, ForwardDispatcher) {
        let store: Arc<dyn KvStore> = Arc::new(InMemoryStore::new());
        let subs = Arc::new(SubscriptionStore::new(store.clone(), "repost"));
        let dispatcher = ForwardDispatcher::new(subs.clone(), messenger);
        (store, subs, dispatcher)
    }

    #[tokio::test]
    async fn fans_out_once_per_target() {
        let messenger = Arc::new(FakeMessenger::default());
        let (_, subs, dispatcher) = setup(messenger.clone()).await;
        let s = ChatId(10);
        for t in [ChatId(1), ChatId(2), ChatId(3)] {
            subs.toggle(t, s).await.unwrap();
        }

        let report = dispatcher.dispatch(msg(10)).await.unwrap();

        assert_eq!(
            report,
            DispatchReport {
                attempted: 3,
                delivered: 3,
                failed: 0
            }
        );
        assert_eq!(
            messenger.forward_destinations(),
            vec![ChatId(1), ChatId(2), ChatId(3)]
        );
        assert!(messenger
            .forwards
            .lock()
            .unwrap()
            .iter()
            .all(|(_, origin)| *origin == msg(10)));
    }

    #[tokio::test]
    async fn never_forwards_into_the_source() {
        let messenger = Arc::new(FakeMessenger::default());
        let (store, subs, dispatcher) = setup(messenger.clone()).await;
        // A self-loop written behind the store's back.
        store
            .set_add("repost:target_sources:10", "10")
            .await
            .unwrap();
        subs.toggle(ChatId(1), ChatId(10)).await.unwrap();

        assert_eq!(
            dispatcher.destinations_for(ChatId(10)).await.unwrap(),
            vec![ChatId(1)]
        );
        dispatcher.dispatch(msg(10)).await.unwrap();
        assert_eq!(messenger.forward_destinations(), vec![ChatId(1)]);
    }

    #[tokio::test]
    async fn one_failing_target_does_not_stop_the_rest() {
        let messenger = Arc::new(FakeMessenger::failing_for(&[ChatId(2)]));
        let (_, subs, dispatcher) = setup(messenger.clone()).await;
        for t in [ChatId(1), ChatId(2), ChatId(3)] {
            subs.toggle(t, ChatId(10)).await.unwrap();
        }

        let report = dispatcher.dispatch(msg(10)).await.unwrap();

        assert_eq!(report.attempted, 3);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(messenger.forward_destinations().len(), 3);
    }

    #[tokio::test]
    async fn unsubscribed_source_forwards_nothing() {
        let messenger = Arc::new(FakeMessenger::default());
        let (_, _, dispatcher) = setup(messenger.clone()).await;

        let report = dispatcher.dispatch(msg(10)).await.unwrap();
        assert_eq!(report, DispatchReport::default());
        assert!(messenger.forward_destinations().is_empty());
    }
}
