use std::collections::{BTreeMap, HashSet};

use crate::{
    domain::ChatId, registry::GroupRegistry, subscriptions::SubscriptionStore, Result,
};

const ACTIVE_MARK: &str = "✅";
const INACTIVE_MARK: &str = "⬜️";

/// One numbered line of the selection menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub chat_id: ChatId,
    pub title: String,
    pub active: bool,
}

/// Ordered list of chats that can be toggled as sources of `target`.
///
/// The position of each entry is the number the operator types.
pub async fn build_candidate_list(
    registry: &GroupRegistry,
    subscriptions: &SubscriptionStore,
    target: ChatId,
) -> Result<Vec<Candidate>> {
    let known = registry.list_all().await?;
    let active = subscriptions.sources_of(target).await?;
    Ok(candidates_from(known, &active, target))
}

/// Pure half of `build_candidate_list`.
///
/// Excludes `target`, marks active sources and sorts by title. The sort is stable over
/// chat-id order, so equal titles always come out in the same order.
pub fn candidates_from(
    known: BTreeMap<ChatId, String>,
    active: &HashSet<ChatId>,
    target: ChatId,
) -> Vec<Candidate> {
    let mut items: Vec<Candidate> = known
        .into_iter()
        .filter(|(id, _)| *id != target)
        .map(|(chat_id, title)| Candidate {
            active: active.contains(&chat_id),
            chat_id,
            title,
        })
        .collect();
    items.sort_by(|a, b| a.title.cmp(&b.title));
    items
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuFooter {
    /// Menu sent right after the edit command.
    Initial,
    /// Menu sent after a toggle.
    Refreshed,
}

pub fn render_menu(target_title: &str, items: &[Candidate], footer: MenuFooter) -> String {
    let mut lines = vec![format!("Source groups for: {target_title}"), String::new()];
    for (i, item) in items.iter().enumerate() {
        let mark = if item.active {
            ACTIVE_MARK
        } else {
            INACTIVE_MARK
        };
        lines.push(format!("{}. {mark} {}", i + 1, item.title));
    }
    lines.push(String::new());
    lines.push(
        match footer {
            MenuFooter::Initial => {
                "Send a number to turn that group on or off as a source for this group."
            }
            MenuFooter::Refreshed => {
                "Send another number to toggle one more group. \
You can simply stop replying when you are done."
            }
        }
        .to_string(),
    );
    lines.join("\n")
}

/// Length as Telegram counts it: UTF-16 code units.
pub fn telegram_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Split `text` into chunks of at most `limit` UTF-16 code units, preferring line boundaries.
///
/// A single line longer than `limit` is cut on character boundaries.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    // Room for one surrogate pair.
    let limit = limit.max(2);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.split('\n') {
        let line_len = telegram_len(line);
        let needed = if current.is_empty() {
            line_len
        } else {
            current_len + 1 + line_len
        };

        if needed <= limit {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            current_len = needed;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= limit {
            current.push_str(line);
            current_len = line_len;
            continue;
        }

        for ch in line.chars() {
            let width = ch.len_utf16();
            if current_len + width > limit {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(ch);
            current_len += width;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, KvStore};
    use std::sync::Arc;

    fn known(entries: &[(i64, &str)]) -> BTreeMap<ChatId, String> {
        entries
            .iter()
            .map(|(id, t)| (ChatId(*id), t.to_string()))
            .collect()
    }

    #[test]
    fn excludes_target_and_marks_active() {
        let items = candidates_from(
            known(&[(101, "Alpha"), (102, "Beta"), (103, "Gamma")]),
            &HashSet::from([ChatId(103)]),
            ChatId(101),
        );

        assert_eq!(
            items,
            vec![
                Candidate {
                    chat_id: ChatId(102),
                    title: "Beta".to_string(),
                    active: false
                },
                Candidate {
                    chat_id: ChatId(103),
                    title: "Gamma".to_string(),
                    active: true
                },
            ]
        );
    }

    #[test]
    fn sorts_case_sensitively_and_keeps_ties_stable() {
        let items = candidates_from(
            known(&[(1, "beta"), (2, "Same"), (3, "Alpha"), (4, "Same"), (5, "Zed")]),
            &HashSet::new(),
            ChatId(0),
        );
        let order: Vec<i64> = items.iter().map(|c| c.chat_id.0).collect();
        // Uppercase sorts before lowercase.
        assert_eq!(order, vec![3, 2, 4, 5, 1]);
    }

    #[tokio::test]
    async fn rederiving_without_changes_is_identical() {
        let store: Arc<dyn KvStore> = Arc::new(InMemoryStore::new());
        let registry = GroupRegistry::new(store.clone(), "repost");
        let subs = SubscriptionStore::new(store, "repost");
        for (id, title) in [(5, "Echo"), (3, "Charlie"), (4, "Charlie"), (1, "Alpha")] {
            registry.register_or_update(ChatId(id), title).await.unwrap();
        }
        subs.toggle(ChatId(1), ChatId(4)).await.unwrap();

        let first = build_candidate_list(&registry, &subs, ChatId(1)).await.unwrap();
        let second = build_candidate_list(&registry, &subs, ChatId(1)).await.unwrap();

        assert_eq!(first, second);
        assert!(first.iter().all(|c| c.chat_id != ChatId(1)));
        assert_eq!(
            first.iter().map(|c| (c.chat_id.0, c.active)).collect::<Vec<_>>(),
            vec![(3, false), (4, true), (5, false)]
        );
    }

    #[test]
    fn renders_numbered_checkbox_lines() {
        let items = vec![
            Candidate {
                chat_id: ChatId(2),
                title: "Beta".to_string(),
                active: true,
            },
            Candidate {
                chat_id: ChatId(3),
                title: "Gamma".to_string(),
                active: false,
            },
        ];
        let text = render_menu("Alpha", &items, MenuFooter::Initial);

        assert!(text.starts_with("Source groups for: Alpha\n\n"));
        assert!(text.contains("1. ✅ Beta"));
        assert!(text.contains("2. ⬜️ Gamma"));
        assert!(text.ends_with("as a source for this group."));
    }

    #[test]
    fn split_prefers_line_boundaries() {
        let text = "aaaa\nbbbb\ncccc";
        assert_eq!(split_message(text, 100), vec![text.to_string()]);
        assert_eq!(
            split_message(text, 9),
            vec!["aaaa\nbbbb".to_string(), "cccc".to_string()]
        );
        assert_eq!(
            split_message("abcdefg", 3),
            vec!["abc".to_string(), "def".to_string(), "g".to_string()]
        );
    }

    #[test]
    fn split_counts_astral_emoji_as_two_units() {
        let items: Vec<Candidate> = (0..120)
            .map(|i| Candidate {
                chat_id: ChatId(i),
                title: format!("{} Group {i:03}", "🚀".repeat(14)),
                active: i % 2 == 0,
            })
            .collect();
        let text = render_menu("Launch", &items, MenuFooter::Initial);

        let chunks = split_message(&text, 4000);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| telegram_len(c) <= 4000));
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn long_line_cut_never_splits_a_surrogate_pair() {
        let line = "🚀".repeat(5);
        let chunks = split_message(&line, 3);

        assert_eq!(chunks, vec!["🚀".to_string(); 5]);
    }
}
