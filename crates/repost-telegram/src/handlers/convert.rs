use teloxide::types::{Chat, Message};

use repost_core::{
    domain::{ChatId, ChatKind, Conversation, MessageId, UserId},
    messaging::types::InboundEvent,
};

fn chat_kind(chat: &Chat) -> ChatKind {
    if chat.is_private() {
        ChatKind::Private
    } else if chat.is_channel() {
        ChatKind::Channel
    } else {
        ChatKind::Group
    }
}

fn conversation(chat: &Chat) -> Conversation {
    Conversation {
        id: ChatId(chat.id.0),
        title: chat.title().map(str::to_string),
        kind: chat_kind(chat),
    }
}

pub fn to_inbound_event(msg: &Message) -> InboundEvent {
    InboundEvent {
        chat: conversation(&msg.chat),
        sender: msg.from().map(|u| UserId(u.id.0 as i64)),
        sender_chat: msg.sender_chat().map(conversation),
        text: msg.text().map(str::to_string),
        message_id: MessageId(msg.id.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(raw: serde_json::Value) -> Message {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn supergroup_command() {
        let msg = message(json!({
            "message_id": 5,
            "date": 1_700_000_000,
            "chat": { "id": -1001, "type": "supergroup", "title": "Alpha" },
            "from": { "id": 7, "is_bot": false, "first_name": "Op" },
            "text": "/repost"
        }));

        let ev = to_inbound_event(&msg);

        assert_eq!(ev.chat.id, ChatId(-1001));
        assert_eq!(ev.chat.kind, ChatKind::Group);
        assert_eq!(ev.chat.title.as_deref(), Some("Alpha"));
        assert_eq!(ev.sender, Some(UserId(7)));
        assert_eq!(ev.text.as_deref(), Some("/repost"));
        assert_eq!(ev.message_id, MessageId(5));
    }

    #[test]
    fn private_reply() {
        let msg = message(json!({
            "message_id": 11,
            "date": 1_700_000_000,
            "chat": { "id": 7, "type": "private", "first_name": "Op" },
            "from": { "id": 7, "is_bot": false, "first_name": "Op" },
            "text": "2"
        }));

        let ev = to_inbound_event(&msg);

        assert_eq!(ev.chat.kind, ChatKind::Private);
        assert!(ev.chat.title.is_none());
        assert_eq!(ev.sender, Some(UserId(7)));
        assert_eq!(ev.text.as_deref(), Some("2"));
    }

    #[test]
    fn channel_post_has_no_user() {
        let msg = message(json!({
            "message_id": 9,
            "date": 1_700_000_000,
            "chat": { "id": -1002, "type": "channel", "title": "News" },
            "sender_chat": { "id": -1002, "type": "channel", "title": "News" },
            "text": "breaking"
        }));

        let ev = to_inbound_event(&msg);

        assert_eq!(ev.chat.kind, ChatKind::Channel);
        assert!(ev.sender.is_none());
        assert_eq!(
            ev.sender_chat.map(|c| (c.id, c.kind)),
            Some((ChatId(-1002), ChatKind::Channel))
        );
    }
}
