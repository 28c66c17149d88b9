//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 切断したセッションにはそれ以降配信されないことを確認
//! - 二重の切断（読み取り側と書き込み側の両方から）が安全であることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断
//! - エッジケース：同じセッションの二重切断、停止済みルームからの切断

use crate::{
    domain::SessionId,
    infrastructure::hub::RoomHandle,
};

/// 参加者切断のユースケース
#[derive(Debug, Default)]
pub struct DisconnectParticipantUseCase;

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new() -> Self {
        Self
    }

    /// 参加者をルームから外す
    ///
    /// 何度呼んでも安全。ルームが既に停止していればセッションも閉じられている。
    pub fn execute(&self, room: &RoomHandle, session_id: SessionId) {
        match room.unregister(session_id) {
            Ok(()) => tracing::info!(
                "Session {} left board '{}'",
                session_id,
                room.board_id()
            ),
            Err(e) => tracing::debug!("Session {} already gone: {}", session_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::RoomConfig,
        domain::{BoardId, ChatMessage, Identity, MessageKind, Timestamp, UserId},
        infrastructure::hub::{Hub, Session},
    };

    fn board() -> BoardId {
        BoardId::new("board-1".to_string()).unwrap()
    }

    fn identity(user: &str) -> Identity {
        Identity::new(UserId::new(user.to_string()).unwrap(), String::new())
    }

    fn hub() -> Hub {
        Hub::new(RoomConfig {
            idle_timeout: None,
            presence_notices: false,
        })
    }

    #[tokio::test]
    async fn test_disconnect_stops_delivery() {
        // テスト項目: 切断したセッションには配信されず、キューが閉じられる
        // given (前提条件):
        let hub = hub();
        let (alice, mut alice_inbox) = Session::new(board(), identity("alice"), Timestamp::new(1), 8);
        let (bob, mut bob_inbox) = Session::new(board(), identity("bob"), Timestamp::new(2), 8);
        hub.join(alice.clone()).await.unwrap();
        let room = hub.join(bob.clone()).await.unwrap();
        let usecase = DisconnectParticipantUseCase::new();

        // when (操作):
        usecase.execute(&room, alice.id());
        let message = ChatMessage::stamped(
            MessageKind::Text,
            "after".to_string(),
            board(),
            &identity("bob"),
            Timestamp::new(3),
        );
        room.broadcast(Arc::new(message)).unwrap();

        // then (期待する結果):
        assert_eq!(bob_inbox.recv().await.unwrap().content, "after");
        assert!(alice_inbox.recv().await.is_none());
        let members = room.members().await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].session_id, bob.id());
    }

    #[tokio::test]
    async fn test_disconnect_twice_is_harmless() {
        // テスト項目: 同じセッションを二度切断しても問題ない
        // given (前提条件):
        let hub = hub();
        let (alice, _inbox) = Session::new(board(), identity("alice"), Timestamp::new(1), 8);
        let room = hub.join(alice.clone()).await.unwrap();
        let usecase = DisconnectParticipantUseCase::new();

        // when (操作):
        usecase.execute(&room, alice.id());
        usecase.execute(&room, alice.id());

        // then (期待する結果):
        assert!(room.members().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_from_stopped_room() {
        // テスト項目: 停止済みのルームからの切断はパニックしない
        // given (前提条件):
        let hub = hub();
        let (alice, mut inbox) = Session::new(board(), identity("alice"), Timestamp::new(1), 8);
        let room = hub.join(alice.clone()).await.unwrap();
        hub.shutdown();
        assert!(inbox.recv().await.is_none());

        // when (操作):
        DisconnectParticipantUseCase::new().execute(&room, alice.id());

        // then (期待する結果):
        assert!(alice.is_closed());
    }
}
