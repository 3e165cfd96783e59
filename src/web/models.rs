use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::{KeyPress, Message};

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<Uuid>,
    /// The key that triggered the send; absent for button clicks.
    pub key: Option<KeyPress>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub user_message: Message,
    pub reply: Message,
}

#[derive(Debug, Serialize)]
pub struct SessionView<'a> {
    pub session_id: Uuid,
    pub loading: bool,
    pub messages: &'a [Message],
}
