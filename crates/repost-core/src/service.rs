use std::sync::Arc;

use crate::{
    command::{is_command, parse_command},
    config::{Config, SourcePolicy},
    dispatch::{DispatchReport, ForwardDispatcher},
    domain::{fallback_title, ChatId, ChatKind, UserId},
    menu::{build_candidate_list, render_menu, split_message, Candidate, MenuFooter},
    messaging::{port::MessagingPort, types::InboundEvent},
    notices,
    registry::GroupRegistry,
    selection::{parse_choice, ChoiceError, SelectionSession, SelectionSessions},
    store::KvStore,
    subscriptions::SubscriptionStore,
};

/// What handling one inbound event amounted to.
///
/// The transport ignores this; it exists so the routing can be observed in logs and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    MenuSent { target: ChatId, entries: usize },
    EmptyCandidateList,
    Unauthorized,
    Toggled {
        target: ChatId,
        source: ChatId,
        active: bool,
    },
    ToggleFailed,
    InvalidUserInput(ChoiceError),
    NoActiveSession,
    Help,
    Forwarded(DispatchReport),
    DispatchFailed,
}

/// Coordinates registry, subscriptions, operator sessions and forwarding.
///
/// Owns the session map; everything else is shared state behind the store.
pub struct RelayService {
    cfg: Arc<Config>,
    registry: Arc<GroupRegistry>,
    subscriptions: Arc<SubscriptionStore>,
    dispatcher: ForwardDispatcher,
    sessions: SelectionSessions,
    messenger: Arc<dyn MessagingPort>,
}

impl RelayService {
    pub fn new(
        cfg: Arc<Config>,
        store: Arc<dyn KvStore>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        let registry = Arc::new(GroupRegistry::new(store.clone(), &cfg.key_prefix));
        let subscriptions = Arc::new(SubscriptionStore::new(store, &cfg.key_prefix));
        let dispatcher = ForwardDispatcher::new(subscriptions.clone(), messenger.clone());

        Self {
            cfg,
            registry,
            subscriptions,
            dispatcher,
            sessions: SelectionSessions::new(),
            messenger,
        }
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    pub fn subscriptions(&self) -> &SubscriptionStore {
        &self.subscriptions
    }

    /// Handle one inbound event. Never fails: every problem becomes a notice or a log line.
    pub async fn handle_event(&self, ev: InboundEvent) -> EventOutcome {
        match ev.chat.kind {
            ChatKind::Private => self.handle_private(&ev).await,
            ChatKind::Group | ChatKind::Channel => self.handle_public(&ev).await,
        }
    }

    async fn handle_public(&self, ev: &InboundEvent) -> EventOutcome {
        let title = ev.chat.display_title();
        if let Err(e) = self.registry.register_or_update(ev.chat.id, &title).await {
            tracing::warn!(chat_id = ev.chat.id.0, error = %e, "failed to register chat");
        }

        if ev.chat.kind == ChatKind::Group {
            if let (Some(operator), Some(text)) = (ev.sender, ev.text.as_deref()) {
                if is_command(text, &self.cfg.edit_command) {
                    // Anonymous admins and channel identities arrive with a service-bot `from`.
                    if let Some(on_behalf_of) = &ev.sender_chat {
                        tracing::info!(
                            chat_id = ev.chat.id.0,
                            sender_chat = on_behalf_of.id.0,
                            "edit command sent on behalf of a chat; ignoring"
                        );
                        return EventOutcome::Ignored;
                    }
                    return self.open_menu(operator, ev.chat.id, &title).await;
                }
            }
        }

        if !self.is_forwarding_origin(ev) {
            return EventOutcome::Ignored;
        }

        match self.dispatcher.dispatch(ev.message_ref()).await {
            Ok(report) => EventOutcome::Forwarded(report),
            Err(e) => {
                tracing::warn!(
                    chat_id = ev.chat.id.0,
                    error = %e,
                    "could not resolve destinations"
                );
                EventOutcome::DispatchFailed
            }
        }
    }

    fn is_forwarding_origin(&self, ev: &InboundEvent) -> bool {
        match self.cfg.source_policy {
            SourcePolicy::AnyPublicChat => ev.chat.is_public(),
            SourcePolicy::ChannelPostsOnly => {
                ev.chat.kind == ChatKind::Channel
                    || (ev.chat.kind == ChatKind::Group
                        && ev
                            .sender_chat
                            .as_ref()
                            .is_some_and(|c| c.kind == ChatKind::Channel))
            }
        }
    }

    async fn open_menu(
        &self,
        operator: UserId,
        target: ChatId,
        target_title: &str,
    ) -> EventOutcome {
        if !self.cfg.is_operator_allowed(operator.0) {
            self.notify(operator, &notices::unauthorized()).await;
            return EventOutcome::Unauthorized;
        }

        // Display path: an unreadable store shows up as an empty list.
        let items = match build_candidate_list(&self.registry, &self.subscriptions, target).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    target_chat = target.0,
                    error = %e,
                    "could not build candidate list"
                );
                Vec::new()
            }
        };

        if items.is_empty() {
            self.sessions.close(operator).await;
            self.notify(operator, &notices::no_candidates(&self.cfg.edit_command))
                .await;
            return EventOutcome::EmptyCandidateList;
        }

        self.sessions
            .open(
                operator,
                SelectionSession {
                    target,
                    choices: choice_ids(&items),
                },
            )
            .await;
        tracing::info!(
            user_id = operator.0,
            target_chat = target.0,
            entries = items.len(),
            "menu opened"
        );

        self.notify(
            operator,
            &render_menu(target_title, &items, MenuFooter::Initial),
        )
        .await;
        EventOutcome::MenuSent {
            target,
            entries: items.len(),
        }
    }

    async fn handle_private(&self, ev: &InboundEvent) -> EventOutcome {
        let (Some(operator), Some(text)) = (ev.sender, ev.text.as_deref()) else {
            return EventOutcome::Ignored;
        };

        if let Some((cmd, _)) = parse_command(text) {
            if cmd == "start" || cmd == "help" {
                self.notify(operator, &notices::help(&self.cfg.edit_command))
                    .await;
                return EventOutcome::Help;
            }
        }

        let Some(session) = self.sessions.get(operator).await else {
            self.notify(operator, &notices::no_active_session(&self.cfg.edit_command))
                .await;
            return EventOutcome::NoActiveSession;
        };

        if !self.cfg.is_operator_allowed(operator.0) {
            self.sessions.close(operator).await;
            self.notify(operator, &notices::unauthorized()).await;
            return EventOutcome::Unauthorized;
        }

        let source = match parse_choice(text, session.choices.len())
            .and_then(|idx| {
                session.resolve(idx).ok_or(ChoiceError::OutOfRange {
                    max: session.choices.len(),
                })
            }) {
            Ok(source) => source,
            Err(err) => {
                self.notify(operator, &notices::invalid_choice(err)).await;
                return EventOutcome::InvalidUserInput(err);
            }
        };

        self.apply_choice(operator, &session, source).await
    }

    async fn apply_choice(
        &self,
        operator: UserId,
        session: &SelectionSession,
        source: ChatId,
    ) -> EventOutcome {
        let target = session.target;
        let target_title = self.title_or_fallback(target).await;
        let source_title = self.title_or_fallback(source).await;

        let active = match self.subscriptions.toggle(target, source).await {
            Ok(active) => active,
            Err(e) => {
                tracing::error!(
                    user_id = operator.0,
                    target_chat = target.0,
                    source_chat = source.0,
                    error = %e,
                    "toggle failed"
                );
                self.notify(operator, &notices::toggle_failed(&source_title))
                    .await;
                // Show whatever the store holds now so a retry is not a blind toggle.
                self.resend_menu(operator, target, &target_title).await;
                return EventOutcome::ToggleFailed;
            }
        };
        tracing::info!(
            user_id = operator.0,
            target_chat = target.0,
            source_chat = source.0,
            active,
            "subscription toggled"
        );
        self.notify(
            operator,
            &notices::toggled(&source_title, &target_title, active),
        )
        .await;
        self.resend_menu(operator, target, &target_title).await;

        EventOutcome::Toggled {
            target,
            source,
            active,
        }
    }

    /// Rebuild the list for `target` and send it again.
    ///
    /// When the list cannot be rebuilt the session is closed, so the next number cannot act on
    /// a stale view.
    async fn resend_menu(&self, operator: UserId, target: ChatId, target_title: &str) {
        match build_candidate_list(&self.registry, &self.subscriptions, target).await {
            Ok(items) if !items.is_empty() => {
                // A concurrent edit command re-anchored the operator; its menu is the live one.
                if self
                    .sessions
                    .refresh(operator, target, choice_ids(&items))
                    .await
                {
                    self.notify(
                        operator,
                        &render_menu(target_title, &items, MenuFooter::Refreshed),
                    )
                    .await;
                }
            }
            res => {
                if let Err(e) = res {
                    tracing::warn!(
                        target_chat = target.0,
                        error = %e,
                        "could not rebuild candidate list"
                    );
                }
                self.sessions.close_if(operator, target).await;
                self.notify(
                    operator,
                    &notices::menu_unavailable(&self.cfg.edit_command),
                )
                .await;
            }
        }
    }

    async fn title_or_fallback(&self, chat_id: ChatId) -> String {
        match self.registry.title_of(chat_id).await {
            Ok(Some(title)) if !title.trim().is_empty() => title,
            Ok(_) => fallback_title(chat_id),
            Err(e) => {
                tracing::warn!(chat_id = chat_id.0, error = %e, "title lookup failed");
                fallback_title(chat_id)
            }
        }
    }

    /// Best-effort private message; failures are logged, never returned.
    async fn notify(&self, operator: UserId, text: &str) {
        let chat = ChatId(operator.0);
        for chunk in split_message(text, self.cfg.telegram_safe_limit) {
            if let Err(e) = self.messenger.send_text(chat, &chunk).await {
                tracing::warn!(user_id = operator.0, error = %e, "notice not delivered");
                return;
            }
        }
    }
}

fn choice_ids(items: &[Candidate]) -> Vec<ChatId> {
    items.iter().map(|c| c.chat_id).collect()
}
