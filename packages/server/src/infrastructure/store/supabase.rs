//! Message store backed by the `messages` table of a Supabase project.

use async_trait::async_trait;
use reqwest::Method;

use crate::{
    domain::{BoardId, ChatMessage, MessageStore, StoreError, StoredMessage},
    infrastructure::{
        dto::rest::{MessageInsertRow, MessageRow},
        supabase::{SupabaseClient, check_status},
    },
};

const TABLE: &str = "messages";

pub struct SupabaseMessageStore {
    client: SupabaseClient,
}

impl SupabaseMessageStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageStore for SupabaseMessageStore {
    async fn append(&self, message: &ChatMessage) -> Result<(), StoreError> {
        let row = MessageInsertRow::from(message);
        let response = self
            .client
            .rest(Method::POST, TABLE)
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        check_status(response)
            .await
            .map_err(|(status, body)| StoreError::Rejected { status, body })?;
        Ok(())
    }

    async fn fetch_history(
        &self,
        board_id: &BoardId,
        limit: Option<usize>,
    ) -> Result<Vec<StoredMessage>, StoreError> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("board_id", format!("eq.{}", board_id)),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let response = self
            .client
            .rest(Method::GET, TABLE)
            .query(&query)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let response = check_status(response)
            .await
            .map_err(|(status, body)| StoreError::Rejected { status, body })?;
        let rows: Vec<MessageRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(collect_history(rows, board_id))
    }
}

/// Convert fetched rows, dropping the ones that do not convert, and order
/// them oldest first.
fn collect_history(rows: Vec<MessageRow>, board_id: &BoardId) -> Vec<StoredMessage> {
    let mut history: Vec<StoredMessage> = rows
        .into_iter()
        .filter_map(|row| match StoredMessage::try_from(row) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::warn!("Skipping history row for board '{}': {}", board_id, e);
                None
            }
        })
        .collect();
    history.sort_by_key(|m| m.created_at);
    history
}
