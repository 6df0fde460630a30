//! Test doubles shared by the unit tests.

use std::{collections::HashSet, sync::Mutex};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

/// Records every send/forward; chats listed in `failing` reject both.
#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    pub sends: Mutex<Vec<(ChatId, String)>>,
    pub forwards: Mutex<Vec<(ChatId, MessageRef)>>,
    failing: HashSet<ChatId>,
}

impl FakeMessenger {
    pub fn failing_for(chats: &[ChatId]) -> Self {
        Self {
            failing: chats.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        MessageRef {
            chat_id,
            message_id: MessageId(*guard),
        }
    }

    pub fn texts_to(&self, chat_id: ChatId) -> Vec<String> {
        self.sends
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == chat_id)
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn forward_destinations(&self) -> Vec<ChatId> {
        let mut out: Vec<ChatId> = self
            .forwards
            .lock()
            .unwrap()
            .iter()
            .map(|(c, _)| *c)
            .collect();
        out.sort();
        out
    }

    pub fn clear(&self) {
        self.sends.lock().unwrap().clear();
        self.forwards.lock().unwrap().clear();
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        self.sends.lock().unwrap().push((chat_id, text.to_string()));
        if self.failing.contains(&chat_id) {
            return Err(Error::OutboundDeliveryFailed(format!(
                "chat {} rejected the message",
                chat_id.0
            )));
        }
        Ok(self.alloc(chat_id))
    }

    async fn forward_message(&self, destination: ChatId, origin: MessageRef) -> Result<MessageRef> {
        self.forwards.lock().unwrap().push((destination, origin));
        if self.failing.contains(&destination) {
            return Err(Error::OutboundDeliveryFailed(format!(
                "bot was kicked from chat {}",
                destination.0
            )));
        }
        Ok(self.alloc(destination))
    }
}
