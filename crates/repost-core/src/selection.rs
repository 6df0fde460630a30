use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{ChatId, UserId};

/// An operator's pending menu: the target under edit and what each number means.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionSession {
    pub target: ChatId,
    /// `choices[i]` is the chat behind menu number `i + 1`.
    pub choices: Vec<ChatId>,
}

impl SelectionSession {
    pub fn resolve(&self, index: usize) -> Option<ChatId> {
        index
            .checked_sub(1)
            .and_then(|i| self.choices.get(i))
            .copied()
    }
}

/// Why a private reply could not be used as a menu choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceError {
    NotANumber,
    OutOfRange { max: usize },
}

/// Interpret `text` as a 1-based position in a menu of `len` entries.
pub fn parse_choice(text: &str, len: usize) -> Result<usize, ChoiceError> {
    let txt = text.trim();
    if txt.is_empty() || !txt.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ChoiceError::NotANumber);
    }
    match txt.parse::<usize>() {
        Ok(idx) if (1..=len).contains(&idx) => Ok(idx),
        // Digit runs that overflow are still integers, just out of range.
        _ => Err(ChoiceError::OutOfRange { max: len }),
    }
}

/// In-memory session map, one entry per operator.
///
/// Lost on restart; operators recover by reissuing the edit command.
#[derive(Debug, Default)]
pub struct SelectionSessions {
    inner: Mutex<HashMap<UserId, SelectionSession>>,
}

impl SelectionSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or overwrite) the operator's session.
    pub async fn open(&self, operator: UserId, session: SelectionSession) {
        self.inner.lock().await.insert(operator, session);
    }

    pub async fn get(&self, operator: UserId) -> Option<SelectionSession> {
        self.inner.lock().await.get(&operator).cloned()
    }

    /// Replace the choices of a session still anchored to `target`.
    ///
    /// Returns false when the operator re-anchored in the meantime; the newer session
    /// is left alone.
    pub async fn refresh(&self, operator: UserId, target: ChatId, choices: Vec<ChatId>) -> bool {
        let mut map = self.inner.lock().await;
        match map.get_mut(&operator) {
            Some(session) if session.target == target => {
                session.choices = choices;
                true
            }
            _ => false,
        }
    }

    /// Drop the session if it is still anchored to `target`.
    pub async fn close_if(&self, operator: UserId, target: ChatId) {
        let mut map = self.inner.lock().await;
        if map.get(&operator).is_some_and(|s| s.target == target) {
            map.remove(&operator);
        }
    }

    pub async fn close(&self, operator: UserId) {
        self.inner.lock().await.remove(&operator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_integers_in_range() {
        assert_eq!(parse_choice("1", 3), Ok(1));
        assert_eq!(parse_choice(" 3 \n", 3), Ok(3));
        assert_eq!(parse_choice("007", 10), Ok(7));
    }

    #[test]
    fn rejects_non_numeric_text() {
        for text in ["", "  ", "abc", "1a", "-1", "+1", "1.0", "١"] {
            assert_eq!(parse_choice(text, 5), Err(ChoiceError::NotANumber), "{text:?}");
        }
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        assert_eq!(parse_choice("0", 1), Err(ChoiceError::OutOfRange { max: 1 }));
        assert_eq!(parse_choice("5", 1), Err(ChoiceError::OutOfRange { max: 1 }));
        assert_eq!(
            parse_choice("99999999999999999999999", 1),
            Err(ChoiceError::OutOfRange { max: 1 })
        );
    }

    #[test]
    fn resolve_is_one_based() {
        let s = SelectionSession {
            target: ChatId(1),
            choices: vec![ChatId(10), ChatId(20)],
        };
        assert_eq!(s.resolve(0), None);
        assert_eq!(s.resolve(1), Some(ChatId(10)));
        assert_eq!(s.resolve(2), Some(ChatId(20)));
        assert_eq!(s.resolve(3), None);
    }

    #[tokio::test]
    async fn refresh_only_applies_to_same_target() {
        let sessions = SelectionSessions::new();
        let op = UserId(7);
        sessions
            .open(
                op,
                SelectionSession {
                    target: ChatId(1),
                    choices: vec![ChatId(2)],
                },
            )
            .await;

        assert!(sessions.refresh(op, ChatId(1), vec![ChatId(3)]).await);
        assert_eq!(sessions.get(op).await.unwrap().choices, vec![ChatId(3)]);

        assert!(!sessions.refresh(op, ChatId(9), vec![ChatId(4)]).await);
        assert_eq!(sessions.get(op).await.unwrap().choices, vec![ChatId(3)]);
        assert!(!sessions.refresh(UserId(8), ChatId(1), vec![]).await);

        sessions.close_if(op, ChatId(9)).await;
        assert!(sessions.get(op).await.is_some());
        sessions.close_if(op, ChatId(1)).await;
        assert!(sessions.get(op).await.is_none());
    }
}
