//! In-memory message store.
//!
//! Used when no managed store is configured, and by tests. Contents are lost
//! on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{BoardId, ChatMessage, MessageStore, StoreError, StoredMessage};

#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    boards: Mutex<HashMap<BoardId, Vec<StoredMessage>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages stored for a board.
    pub async fn count(&self, board_id: &BoardId) -> usize {
        let boards = self.boards.lock().await;
        boards.get(board_id).map_or(0, Vec::len)
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: &ChatMessage) -> Result<(), StoreError> {
        let mut boards = self.boards.lock().await;
        boards
            .entry(message.board_id.clone())
            .or_default()
            .push(StoredMessage {
                content: message.content.clone(),
                user_id: message.sender_id.clone(),
                sender_email: message.sender_email.clone(),
                created_at: message.timestamp,
            });
        Ok(())
    }

    async fn fetch_history(
        &self,
        board_id: &BoardId,
        limit: Option<usize>,
    ) -> Result<Vec<StoredMessage>, StoreError> {
        let boards = self.boards.lock().await;
        let mut history = boards.get(board_id).cloned().unwrap_or_default();
        history.sort_by_key(|m| m.created_at);
        if let Some(limit) = limit {
            let excess = history.len().saturating_sub(limit);
            history.drain(..excess);
        }
        Ok(history)
    }
}
