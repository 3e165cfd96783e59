use log::{debug, warn};
use std::time::Instant;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::message::Message;
use crate::model::CompletionError;

pub const ERROR_TITLE: &str = "Error";
pub const ERROR_DESCRIPTION: &str = "Failed to get a response from the AI. Please try again.";

/// A key event from the input box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: String,
    #[serde(default)]
    pub shift: bool,
}

impl KeyPress {
    /// Enter submits, Shift+Enter is a newline.
    pub fn submits(&self) -> bool {
        self.key == "Enter" && !self.shift
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("message is empty")]
    Empty,
    #[error("a reply is still pending")]
    Busy,
}

/// Transient toast shown when the assistant could not answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub detail: String,
}

/// State of one chat panel: the history, the input box and the
/// loading flag. The history is append-only.
#[derive(Debug)]
pub struct ChatPanel {
    messages: Vec<Message>,
    input: String,
    loading: bool,
    last_activity: Instant,
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatPanel {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            loading: false,
            last_activity: Instant::now(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    pub fn can_send(&self) -> bool {
        !self.loading && !self.input.trim().is_empty()
    }

    /// Moves the current input into the history as a user message and
    /// marks the panel as waiting for a reply.
    ///
    /// Blank input and a panel that is already waiting are rejected
    /// without touching any state.
    pub fn begin_send(&mut self) -> Result<Message, SendError> {
        if !self.can_send() {
            return Err(if self.loading { SendError::Busy } else { SendError::Empty });
        }

        let message = Message::user(std::mem::take(&mut self.input));
        self.messages.push(message.clone());
        self.loading = true;
        self.last_activity = Instant::now();
        debug!("Appended {:?} message {}", message.role(), message.id());
        Ok(message)
    }

    /// Records the outcome of a completion call and clears the loading flag.
    ///
    /// A failure leaves the history alone and yields the toast to show.
    pub fn finish(&mut self, result: Result<String, CompletionError>) -> Result<Message, Notification> {
        self.loading = false;
        self.last_activity = Instant::now();
        match result {
            Ok(reply) => {
                let message = Message::assistant(reply);
                self.messages.push(message.clone());
                Ok(message)
            }
            Err(e) => {
                warn!("Assistant reply failed: {}", e);
                Err(Notification {
                    title: ERROR_TITLE.to_string(),
                    description: ERROR_DESCRIPTION.to_string(),
                    detail: e.to_string(),
                })
            }
        }
    }

    /// Drops a pending reply that will never arrive. The user turn stays
    /// in the history and the panel accepts input again.
    pub fn abandon(&mut self) {
        if self.loading {
            debug!("Abandoning pending reply");
            self.loading = false;
            self.last_activity = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;

    #[test]
    fn blank_input_appends_nothing() {
        let mut panel = ChatPanel::default();
        for text in ["", "   ", "\n\t"] {
            panel.set_input(text);
            assert!(!panel.can_send());
            assert_eq!(panel.begin_send(), Err(SendError::Empty));
        }
        assert!(panel.messages().is_empty());
        assert!(!panel.is_loading());
    }

    #[test]
    fn begin_send_appends_one_user_message_and_clears_input() {
        let mut panel = ChatPanel::default();
        panel.set_input("  How do I track stock?\n");
        let sent = panel.begin_send().unwrap();

        assert_eq!(sent.role(), Role::User);
        assert_eq!(sent.content(), "  How do I track stock?\n");
        assert_eq!(panel.messages(), &[sent]);
        assert_eq!(panel.input(), "");
        assert!(panel.is_loading());
    }

    #[test]
    fn second_send_while_loading_is_rejected() {
        let mut panel = ChatPanel::default();
        panel.set_input("first");
        panel.begin_send().unwrap();

        panel.set_input("second");
        assert!(!panel.can_send());
        assert_eq!(panel.begin_send(), Err(SendError::Busy));
        assert_eq!(panel.messages().len(), 1);
        assert_eq!(panel.input(), "second");
    }

    #[test]
    fn abandoned_reply_frees_the_panel() {
        let mut panel = ChatPanel::new();
        panel.set_input("will the reply come?");
        panel.begin_send().unwrap();

        panel.abandon();
        assert!(!panel.is_loading());
        assert_eq!(panel.messages().len(), 1);

        panel.set_input("try again");
        assert!(panel.can_send());
        panel.begin_send().unwrap();
        assert_eq!(panel.messages().len(), 2);
    }

    #[test]
    fn successful_reply_appends_one_assistant_message() {
        let mut panel = ChatPanel::default();
        panel.set_input("hello");
        panel.begin_send().unwrap();

        let reply = panel.finish(Ok("Hi there".to_string())).unwrap();
        assert_eq!(reply.role(), Role::Assistant);
        assert_eq!(reply.content(), "Hi there");
        assert_eq!(panel.messages().len(), 2);
        assert!(!panel.is_loading());
    }

    #[test]
    fn failed_reply_leaves_history_and_returns_toast() {
        let mut panel = ChatPanel::default();
        panel.set_input("hello");
        panel.begin_send().unwrap();

        let toast = panel.finish(Err(CompletionError::MissingCredential)).unwrap_err();
        assert_eq!(toast.title, "Error");
        assert_eq!(toast.description, ERROR_DESCRIPTION);
        assert!(toast.detail.contains("API key is not configured"));
        assert_eq!(panel.messages().len(), 1);
        assert!(!panel.is_loading());
    }

    #[test]
    fn history_keeps_insertion_order_and_duplicates() {
        let mut panel = ChatPanel::default();
        for _ in 0..2 {
            panel.set_input("same question");
            panel.begin_send().unwrap();
            panel.finish(Ok("same answer".to_string())).unwrap();
        }

        let roles: Vec<Role> = panel.messages().iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(panel.messages()[0].content(), panel.messages()[2].content());
        assert_ne!(panel.messages()[0].id(), panel.messages()[2].id());
    }

    #[test]
    fn only_plain_enter_submits() {
        let enter = KeyPress { key: "Enter".to_string(), shift: false };
        let shift_enter = KeyPress { key: "Enter".to_string(), shift: true };
        let letter = KeyPress { key: "a".to_string(), shift: false };
        assert!(enter.submits());
        assert!(!shift_enter.submits());
        assert!(!letter.submits());
    }
}
