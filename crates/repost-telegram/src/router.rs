use std::sync::Arc;

use teloxide::{
    dispatching::Dispatcher, dptree, error_handlers::LoggingErrorHandler, prelude::*,
    update_listeners::webhooks,
};

use repost_core::{
    config::{Config, WebhookConfig},
    messaging::{port::MessagingPort, timeout::TimeoutMessenger},
    service::RelayService,
    store::KvStore,
};

use crate::handlers;
use crate::TelegramMessenger;

/// Run the bot until the process is stopped.
///
/// Uses long polling unless a webhook is configured.
pub async fn run(cfg: Arc<Config>, store: Arc<dyn KvStore>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => tracing::info!(username = %me.username(), "repost bot started"),
        Err(e) => tracing::warn!(error = %e, "getMe failed, continuing"),
    }

    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> =
        Arc::new(TimeoutMessenger::new(raw_messenger, cfg.outbound_timeout));
    let service = Arc::new(RelayService::new(cfg.clone(), store, messenger));

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handlers::handle_message))
        .branch(Update::filter_channel_post().endpoint(handlers::handle_message));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![service])
        .build();

    match &cfg.webhook {
        Some(hook) => {
            let listener = webhooks::axum(bot, webhook_options(hook)?).await?;
            tracing::info!(listen = %hook.listen, "receiving updates via webhook");
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("webhook listener error"),
                )
                .await;
        }
        None => {
            tracing::info!("receiving updates via long polling");
            dispatcher.dispatch().await;
        }
    }

    Ok(())
}

fn webhook_options(hook: &WebhookConfig) -> anyhow::Result<webhooks::Options> {
    let url = hook
        .url
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid WEBHOOK_URL `{}`: {e}", hook.url))?;
    let mut options = webhooks::Options::new(hook.listen, url);
    if let Some(secret) = &hook.secret {
        options = options.secret_token(secret.clone());
    }
    Ok(options)
}
