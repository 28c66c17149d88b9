//! WebSocket message DTOs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Join,
    Leave,
    History,
}

/// One chat frame, in both directions.
///
/// Every field is optional on input; the server ignores what clients send for
/// the sender, board and timestamp fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub r#type: MessageType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub sender_email: String,
    #[serde(default)]
    pub board_id: String,
    #[serde(default)]
    pub timestamp: i64,
}
