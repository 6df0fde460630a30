/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// How a chat is classified for routing purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatKind {
    /// Direct conversation between a user and the bot.
    Private,
    /// Group or supergroup.
    Group,
    /// Broadcast channel.
    Channel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversation {
    pub id: ChatId,
    pub title: Option<String>,
    pub kind: ChatKind,
}

impl Conversation {
    /// Title shown in menus; chats without one fall back to `chat_<id>`.
    pub fn display_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => fallback_title(self.id),
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self.kind, ChatKind::Group | ChatKind::Channel)
    }
}

pub fn fallback_title(chat_id: ChatId) -> String {
    format!("chat_{}", chat_id.0)
}
