use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

/// MessagingPort decorator that bounds every outbound call.
///
/// A call that does not finish within `limit` is reported as `OutboundDeliveryFailed`;
/// the underlying request is dropped.
pub struct TimeoutMessenger {
    inner: Arc<dyn MessagingPort>,
    limit: Duration,
}

impl TimeoutMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T>(&self, op: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.limit, fut).await {
            Ok(res) => res,
            Err(_) => Err(Error::OutboundDeliveryFailed(format!(
                "{op} timed out after {}ms",
                self.limit.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl MessagingPort for TimeoutMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        self.bounded("send_text", self.inner.send_text(chat_id, text))
            .await
    }

    async fn forward_message(&self, destination: ChatId, origin: MessageRef) -> Result<MessageRef> {
        self.bounded(
            "forward_message",
            self.inner.forward_message(destination, origin),
        )
        .await
    }
}
