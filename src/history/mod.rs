use crate::models::chat::{ ChatMessage, MAX_CONTENT_CHARS, MAX_MESSAGES };

/// The only two roles a stored turn may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// In-memory conversation owned by one widget instance for one session.
///
/// Capped at [`MAX_MESSAGES`] turns; the oldest turns are evicted first so
/// recency is preserved. Turns can only be added through [`push`], which is
/// what keeps the role invariant.
///
/// [`push`]: ConversationHistory::push
#[derive(Debug, Default)]
pub struct ConversationHistory {
    turns: Vec<ChatMessage>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Appends a turn, clipping content to [`MAX_CONTENT_CHARS`] characters
    /// and evicting from the front once the cap is exceeded.
    pub fn push(&mut self, role: Role, content: &str) {
        let content = if content.chars().count() > MAX_CONTENT_CHARS {
            content.chars().take(MAX_CONTENT_CHARS).collect()
        } else {
            content.to_string()
        };

        self.turns.push(ChatMessage {
            role: role.as_str().to_string(),
            content,
        });

        while self.turns.len() > MAX_MESSAGES {
            self.turns.remove(0);
        }
    }

    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_grows_past_the_cap() {
        let mut history = ConversationHistory::new();
        for i in 0..50 {
            history.push(Role::User, &format!("message {}", i));
            assert!(history.len() <= MAX_MESSAGES);
        }
        assert_eq!(history.len(), MAX_MESSAGES);
    }

    #[test]
    fn evicts_oldest_turns_first() {
        let mut history = ConversationHistory::new();
        for i in 0..MAX_MESSAGES + 3 {
            history.push(Role::User, &format!("message {}", i));
        }
        assert_eq!(history.turns()[0].content, "message 3");
        assert_eq!(
            history.turns().last().unwrap().content,
            format!("message {}", MAX_MESSAGES + 2)
        );
    }

    #[test]
    fn roles_are_always_enumerated() {
        let mut history = ConversationHistory::new();
        history.push(Role::User, "hi");
        history.push(Role::Assistant, "hello");
        for turn in history.turns() {
            assert!(turn.role == "user" || turn.role == "assistant");
        }
    }

    #[test]
    fn clips_oversized_content() {
        let mut history = ConversationHistory::new();
        history.push(Role::User, &"x".repeat(MAX_CONTENT_CHARS + 100));
        assert_eq!(history.turns()[0].content.chars().count(), MAX_CONTENT_CHARS);
    }
}
