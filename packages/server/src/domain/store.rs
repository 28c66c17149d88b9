//! Durable message store interface.
//!
//! The chat core never waits on the store for live delivery: appends are
//! fire-and-forget and history is fetched once per connection, best effort.

use async_trait::async_trait;

use super::{BoardId, ChatMessage, StoreError, StoredMessage};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist one message (board, sender id, sender email, content, timestamp).
    async fn append(&self, message: &ChatMessage) -> Result<(), StoreError>;

    /// Fetch persisted messages for a board, oldest first.
    ///
    /// When `limit` is set only the most recent `limit` messages are returned,
    /// still oldest first.
    async fn fetch_history(
        &self,
        board_id: &BoardId,
        limit: Option<usize>,
    ) -> Result<Vec<StoredMessage>, StoreError>;
}
