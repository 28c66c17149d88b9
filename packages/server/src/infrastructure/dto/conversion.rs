//! Conversion logic between DTOs and domain entities.

use boardchat_shared::time::{rfc3339_to_timestamp, timestamp_to_rfc3339};

use crate::domain::{
    entity::{self, IncomingMessage, MessageKind, StoredMessage},
    error::ValueObjectError,
    value_object::{Timestamp, UserId},
};
use crate::infrastructure::dto::{
    rest::{AuthUser, MessageInsertRow, MessageRow},
    websocket as dto,
};

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::MessageType> for MessageKind {
    fn from(value: dto::MessageType) -> Self {
        match value {
            dto::MessageType::Text => Self::Text,
            dto::MessageType::Join => Self::Join,
            dto::MessageType::Leave => Self::Leave,
            dto::MessageType::History => Self::History,
        }
    }
}

impl From<dto::ChatMessage> for IncomingMessage {
    fn from(dto: dto::ChatMessage) -> Self {
        // history is reserved for server replay
        let kind = match MessageKind::from(dto.r#type) {
            MessageKind::History => MessageKind::Text,
            kind => kind,
        };
        Self {
            kind,
            content: dto.content,
        }
    }
}

impl TryFrom<MessageRow> for StoredMessage {
    type Error = ValueObjectError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let user_id = UserId::new(row.user_id.unwrap_or_default())?;
        let created_at = row
            .created_at
            .as_deref()
            .and_then(rfc3339_to_timestamp)
            .unwrap_or_default();
        Ok(Self {
            content: row.content,
            user_id,
            sender_email: row.sender_email.unwrap_or_default(),
            created_at: Timestamp::new(created_at),
        })
    }
}

impl TryFrom<AuthUser> for entity::Identity {
    type Error = ValueObjectError;

    fn try_from(user: AuthUser) -> Result<Self, Self::Error> {
        Ok(Self::new(
            UserId::new(user.id)?,
            user.email.unwrap_or_default(),
        ))
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<MessageKind> for dto::MessageType {
    fn from(value: MessageKind) -> Self {
        match value {
            MessageKind::Text => Self::Text,
            MessageKind::Join => Self::Join,
            MessageKind::Leave => Self::Leave,
            MessageKind::History => Self::History,
        }
    }
}

impl From<&entity::ChatMessage> for dto::ChatMessage {
    fn from(model: &entity::ChatMessage) -> Self {
        Self {
            r#type: model.kind.into(),
            content: model.content.clone(),
            sender_id: model.sender_id.as_str().to_string(),
            sender_email: model.sender_email.clone(),
            board_id: model.board_id.as_str().to_string(),
            timestamp: model.timestamp.value(),
        }
    }
}

impl From<&entity::ChatMessage> for MessageInsertRow {
    fn from(model: &entity::ChatMessage) -> Self {
        Self {
            board_id: model.board_id.as_str().to_string(),
            user_id: model.sender_id.as_str().to_string(),
            sender_email: model.sender_email.clone(),
            content: model.content.clone(),
            created_at: timestamp_to_rfc3339(model.timestamp.value()),
        }
    }
}
