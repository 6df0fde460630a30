use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    Result,
};

/// Outbound messenger port.
///
/// Both calls are best-effort from the relay's point of view: failures come back as
/// `Error::OutboundDeliveryFailed` and are logged by the caller, never propagated past
/// the event handler.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Plain-text message (no markup) to a chat or user.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    /// Forward `origin` into `destination`, keeping the original attribution.
    async fn forward_message(&self, destination: ChatId, origin: MessageRef) -> Result<MessageRef>;
}
