//! Domain entities

use super::value_object::{BoardId, Timestamp, UserId};

/// Kind of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Join,
    Leave,
    History,
}

/// A validated participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    /// Display address. May be empty when the client did not provide one.
    pub email: String,
}

impl Identity {
    pub fn new(user_id: UserId, email: String) -> Self {
        Self { user_id, email }
    }

    /// Name shown to other participants: the email when present, else the user id.
    pub fn display_name(&self) -> &str {
        if self.email.is_empty() {
            self.user_id.as_str()
        } else {
            &self.email
        }
    }
}

/// Raw connection parameters, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub bearer_token: Option<String>,
}

/// A message as submitted by a client, before the server stamps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub kind: MessageKind,
    pub content: String,
}

/// A message as delivered to sessions.
///
/// `board_id`, `sender_id`, `sender_email` and `timestamp` are always set by
/// the server; nothing the client sends for those fields survives ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub content: String,
    pub board_id: BoardId,
    pub sender_id: UserId,
    pub sender_email: String,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    /// Build a message from an authenticated sender.
    pub fn stamped(
        kind: MessageKind,
        content: String,
        board_id: BoardId,
        sender: &Identity,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            kind,
            content,
            board_id,
            sender_id: sender.user_id.clone(),
            sender_email: sender.email.clone(),
            timestamp,
        }
    }
}

/// A message as read back from the durable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub content: String,
    pub user_id: UserId,
    pub sender_email: String,
    pub created_at: Timestamp,
}

impl StoredMessage {
    /// Turn a persisted row into a `history` message for one board.
    ///
    /// Rows stored without an email fall back to the user id for display.
    pub fn into_history(self, board_id: BoardId) -> ChatMessage {
        let sender_email = if self.sender_email.is_empty() {
            self.user_id.as_str().to_string()
        } else {
            self.sender_email
        };
        ChatMessage {
            kind: MessageKind::History,
            content: self.content,
            board_id,
            sender_id: self.user_id,
            sender_email,
            timestamp: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[test]
    fn test_stamped_copies_sender_identity() {
        // テスト項目: stamped はメッセージに送信者の ID とメールを設定する
        // given (前提条件):
        let sender = Identity::new(user("alice"), "alice@example.com".to_string());
        let board_id = BoardId::new("board-1".to_string()).unwrap();

        // when (操作):
        let msg = ChatMessage::stamped(
            MessageKind::Text,
            "hi".to_string(),
            board_id.clone(),
            &sender,
            Timestamp::new(42),
        );

        // then (期待する結果):
        assert_eq!(msg.sender_id, user("alice"));
        assert_eq!(msg.sender_email, "alice@example.com");
        assert_eq!(msg.board_id, board_id);
        assert_eq!(msg.timestamp, Timestamp::new(42));
    }

    #[test]
    fn test_into_history_falls_back_to_user_id() {
        // テスト項目: メール未設定の履歴はユーザー ID を表示名に使う
        // given (前提条件):
        let stored = StoredMessage {
            content: "old".to_string(),
            user_id: user("bob"),
            sender_email: String::new(),
            created_at: Timestamp::new(1000),
        };
        let board_id = BoardId::new("board-1".to_string()).unwrap();

        // when (操作):
        let msg = stored.into_history(board_id);

        // then (期待する結果):
        assert_eq!(msg.kind, MessageKind::History);
        assert_eq!(msg.sender_email, "bob");
        assert_eq!(msg.timestamp, Timestamp::new(1000));
    }

    #[test]
    fn test_display_name_prefers_email() {
        // テスト項目: 表示名はメールがあればメール、なければユーザー ID
        // given (前提条件):
        let with_email = Identity::new(user("carol"), "carol@example.com".to_string());
        let without_email = Identity::new(user("dave"), String::new());

        // when (操作):

        // then (期待する結果):
        assert_eq!(with_email.display_name(), "carol@example.com");
        assert_eq!(without_email.display_name(), "dave");
    }
}
