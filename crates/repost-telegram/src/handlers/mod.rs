//! Telegram update handlers.
//!
//! Every message and channel post is converted into a transport-agnostic
//! `InboundEvent` and handed to the relay service. The handler always returns `Ok`
//! so Telegram sees each update acknowledged.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use repost_core::service::RelayService;

mod convert;

pub use convert::to_inbound_event;

pub async fn handle_message(msg: Message, service: Arc<RelayService>) -> ResponseResult<()> {
    let event = to_inbound_event(&msg);
    let chat_id = event.chat.id.0;
    let outcome = service.handle_event(event).await;
    tracing::debug!(chat_id, message_id = msg.id.0, ?outcome, "update handled");
    Ok(())
}
