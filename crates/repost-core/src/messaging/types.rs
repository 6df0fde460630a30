use crate::domain::{Conversation, MessageId, MessageRef, UserId};

/// Transport-agnostic inbound update.
///
/// Telegram-specific parsing lives in the Telegram adapter; this is all the relay needs
/// to route a message, a channel post or a private reply.
#[derive(Clone, Debug)]
pub struct InboundEvent {
    /// Chat the message was posted in.
    pub chat: Conversation,
    /// Human author, absent for channel posts.
    pub sender: Option<UserId>,
    /// Chat the message was posted on behalf of (e.g. a linked channel in its
    /// discussion group).
    pub sender_chat: Option<Conversation>,
    pub text: Option<String>,
    pub message_id: MessageId,
}

impl InboundEvent {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat.id,
            message_id: self.message_id,
        }
    }
}
