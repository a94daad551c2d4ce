//! Conversation transcript.
//!
//! Ordered role-tagged messages sent to the model on every chat turn.
//! At most one system message exists and it always sits at index 0.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// One row of the chat display: (user text, assistant text).
pub type DisplayRow = (Option<String>, Option<String>);

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(Message::assistant(text));
    }

    /// Insert the system prompt at index 0, or rewrite it in place.
    pub fn ensure_system_prompt(&mut self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        match self.messages.first_mut() {
            Some(first) if first.role == Role::System => first.content = prompt,
            _ => self.messages.insert(0, Message::system(prompt)),
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// User-authored texts in transcript order.
    pub fn user_texts(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect()
    }

    pub fn last_assistant(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    /// One display row per message. System messages become `(None, None)`.
    ///
    /// Presentation only; model calls always use `messages()`.
    pub fn render_for_display(&self) -> Vec<DisplayRow> {
        self.messages
            .iter()
            .map(|m| match m.role {
                Role::User => (Some(m.content.clone()), None),
                Role::Assistant => (None, Some(m.content.clone())),
                Role::System => (None, None),
            })
            .collect()
    }

    /// Chat-widget layout: a user message and the reply right after it share
    /// one row. System messages are omitted.
    pub fn render_paired(&self) -> Vec<DisplayRow> {
        let mut rows: Vec<DisplayRow> = Vec::new();
        let mut pending_user: Option<String> = None;

        for m in &self.messages {
            match m.role {
                Role::System => {}
                Role::User => {
                    if let Some(prev) = pending_user.take() {
                        rows.push((Some(prev), None));
                    }
                    pending_user = Some(m.content.clone());
                }
                Role::Assistant => rows.push((pending_user.take(), Some(m.content.clone()))),
            }
        }
        if let Some(user) = pending_user {
            rows.push((Some(user), None));
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system_count(t: &Transcript) -> usize {
        t.messages().iter().filter(|m| m.role == Role::System).count()
    }

    #[test]
    fn ensure_system_prompt_is_idempotent() {
        let mut t = Transcript::new();
        t.append_user("hi");
        t.ensure_system_prompt("prompt");
        let len = t.len();
        t.ensure_system_prompt("prompt");
        t.ensure_system_prompt("prompt");
        assert_eq!(t.len(), len);
        assert_eq!(system_count(&t), 1);
        assert_eq!(t.messages()[0], Message::system("prompt"));
    }

    #[test]
    fn ensure_system_prompt_rewrites_in_place() {
        let mut t = Transcript::new();
        t.append_user("a");
        t.ensure_system_prompt("old");
        t.append_assistant("b");
        t.ensure_system_prompt("new");
        assert_eq!(t.len(), 3);
        assert_eq!(t.messages()[0].content, "new");
        assert_eq!(t.messages()[1], Message::user("a"));
        assert_eq!(t.messages()[2], Message::assistant("b"));
    }

    #[test]
    fn system_message_stays_first_across_appends() {
        let mut t = Transcript::new();
        t.ensure_system_prompt("sys");
        for i in 0..5 {
            t.append_user(format!("q{i}"));
            t.append_assistant(format!("a{i}"));
            t.ensure_system_prompt(format!("sys{i}"));
            assert_eq!(t.messages()[0].role, Role::System);
            assert_eq!(system_count(&t), 1);
        }
        assert_eq!(t.len(), 11);
    }

    #[test]
    fn clear_then_first_turn_matches_fresh_session() {
        let mut fresh = Transcript::new();
        fresh.append_user("hi");
        fresh.ensure_system_prompt("sys");

        let mut reused = Transcript::new();
        reused.append_user("old");
        reused.ensure_system_prompt("sys");
        reused.append_assistant("reply");
        reused.clear();
        assert!(reused.is_empty());
        reused.append_user("hi");
        reused.ensure_system_prompt("sys");

        assert_eq!(reused.len(), 2);
        assert_eq!(reused.messages(), fresh.messages());
    }

    #[test]
    fn empty_user_text_is_kept() {
        let mut t = Transcript::new();
        t.append_user("");
        assert_eq!(t.len(), 1);
        assert_eq!(t.user_texts(), vec![""]);
    }

    #[test]
    fn per_message_display_keeps_one_row_per_message() {
        let mut t = Transcript::new();
        t.append_user("Where is the Deku Tree?");
        t.ensure_system_prompt("sys");
        t.append_assistant("Hey, listen! Kokiri Forest!");

        let rows = t.render_for_display();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], (None, None));
        assert_eq!(rows[1], (Some("Where is the Deku Tree?".into()), None));
        assert_eq!(rows[2], (None, Some("Hey, listen! Kokiri Forest!".into())));
    }

    #[test]
    fn paired_display_merges_question_and_reply() {
        let mut t = Transcript::new();
        t.append_user("q1");
        t.ensure_system_prompt("sys");
        t.append_assistant("a1");
        t.append_user("q2");
        t.append_user("q3");
        t.append_assistant("a3");
        t.append_user("q4");

        let rows = t.render_paired();
        assert_eq!(
            rows,
            vec![
                (Some("q1".into()), Some("a1".into())),
                (Some("q2".into()), None),
                (Some("q3".into()), Some("a3".into())),
                (Some("q4".into()), None),
            ]
        );
    }

    #[test]
    fn last_assistant_and_user_texts() {
        let mut t = Transcript::new();
        assert_eq!(t.last_assistant(), None);
        t.append_user("one");
        t.ensure_system_prompt("sys");
        t.append_assistant("first");
        t.append_user("two");
        t.append_assistant("second");
        assert_eq!(t.last_assistant(), Some("second"));
        assert_eq!(t.user_texts(), vec!["one", "two"]);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_value(Message::assistant("x")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "x");
    }
}
