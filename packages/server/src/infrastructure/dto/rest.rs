//! Payloads of the managed store's REST and auth APIs.

use serde::{Deserialize, Serialize};

/// Row written to the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageInsertRow {
    pub board_id: String,
    pub user_id: String,
    pub sender_email: String,
    pub content: String,
    /// Left to the table default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Row read back from the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageRow {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub sender_email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// User returned by `GET /auth/v1/user`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}
