use log::{debug, info};
use std::collections::HashMap;
use uuid::Uuid;

use super::message::Message;
use super::panel::{ChatPanel, SendError};

/// Chat panels of all open browser sessions, capped at `max_sessions`.
///
/// When the cap is reached the idle panel with the oldest activity is
/// dropped to make room. Panels waiting for a reply are never evicted.
#[derive(Debug)]
pub struct SessionStore {
    panels: HashMap<Uuid, ChatPanel>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            panels: HashMap::new(),
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn get(&self, session_id: &Uuid) -> Option<&ChatPanel> {
        self.panels.get(session_id)
    }

    pub fn get_mut(&mut self, session_id: &Uuid) -> Option<&mut ChatPanel> {
        self.panels.get_mut(session_id)
    }

    /// Puts `text` into the session's input box and starts a send.
    ///
    /// A new session is only stored once its first send is accepted.
    pub fn begin_send(&mut self, session_id: Uuid, text: String) -> Result<Message, SendError> {
        if let Some(panel) = self.panels.get_mut(&session_id) {
            panel.set_input(text);
            return panel.begin_send();
        }

        let mut panel = ChatPanel::new();
        panel.set_input(text);
        let message = panel.begin_send()?;
        self.make_room();
        self.panels.insert(session_id, panel);
        debug!("Opened session {} ({} open)", session_id, self.panels.len());
        Ok(message)
    }

    fn make_room(&mut self) {
        while self.panels.len() >= self.max_sessions {
            let oldest = self
                .panels
                .iter()
                .filter(|(_, panel)| !panel.is_loading())
                .min_by_key(|(_, panel)| panel.last_activity())
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    self.panels.remove(&id);
                    info!("Evicted idle session {}", id);
                }
                None => break,
            }
        }
    }
}
