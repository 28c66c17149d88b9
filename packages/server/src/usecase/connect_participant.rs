//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::authenticate() と execute()
//! - 接続パラメータの検証、ルームへの登録、履歴の非同期リプレイ
//!
//! ### なぜこのテストが必要か
//! - パラメータ不足や認証失敗ではセッションを作らないことを保証
//! - 履歴は参加したセッションだけに、参加時刻より前のものだけ届くことを確認
//! - 履歴の取得失敗が接続を妨げないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加と履歴のリプレイ
//! - 異常系：board_id / user_id の欠落、認証失敗、履歴取得の失敗

use std::sync::Arc;

use boardchat_shared::time::Clock;

use crate::{
    config::ChatConfig,
    domain::{
        BoardId, Credentials, Identity, IdentityError, IdentityValidator, MessageStore, Timestamp,
    },
    infrastructure::hub::{Hub, Inbox, RoomHandle, Session},
};

use super::error::ConnectError;

/// Raw connection request, straight from the query string.
#[derive(Debug, Clone, Default)]
pub struct ConnectRequest {
    pub board_id: Option<String>,
    pub credentials: Credentials,
}

/// A session that has joined its room.
#[derive(Debug)]
pub struct Connection {
    pub room: RoomHandle,
    pub session: Session,
    /// Drained by the outbound pump.
    pub inbox: Inbox,
}

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    hub: Arc<Hub>,
    identity_validator: Arc<dyn IdentityValidator>,
    store: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
    outbound_capacity: usize,
    history_limit: Option<usize>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        hub: Arc<Hub>,
        identity_validator: Arc<dyn IdentityValidator>,
        store: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
        config: &ChatConfig,
    ) -> Self {
        Self {
            hub,
            identity_validator,
            store,
            clock,
            outbound_capacity: config.outbound_capacity,
            history_limit: config.history_limit,
        }
    }

    /// Validate the request before the transport is upgraded.
    ///
    /// `board_id` is always required; `user_id` may be omitted when a bearer
    /// token is supplied. Nothing is allocated for a rejected request.
    pub async fn authenticate(
        &self,
        request: ConnectRequest,
    ) -> Result<(BoardId, Identity), ConnectError> {
        let board_id = request
            .board_id
            .and_then(|id| BoardId::new(id).ok())
            .ok_or(ConnectError::MissingParameter("board_id"))?;

        // A bearer token names its owner, so the claimed user id is optional.
        let credentials = &request.credentials;
        let has_token = credentials
            .bearer_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty());
        let has_user_id = credentials
            .user_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        if !has_token && !has_user_id {
            return Err(ConnectError::MissingParameter("user_id"));
        }

        let identity = self
            .identity_validator
            .validate(&request.credentials)
            .await
            .map_err(|e| match e {
                IdentityError::MissingCredential(name) => ConnectError::MissingParameter(name),
                other => ConnectError::Unauthorized(other),
            })?;

        Ok((board_id, identity))
    }

    /// Create the session, join the board's room and start history replay.
    pub async fn execute(
        &self,
        board_id: BoardId,
        identity: Identity,
    ) -> Result<Connection, ConnectError> {
        let joined_at = Timestamp::new(self.clock.now_millis());
        let (session, inbox) =
            Session::new(board_id, identity, joined_at, self.outbound_capacity);

        let room = self.hub.join(session.clone()).await?;

        tokio::spawn(replay_history(
            self.store.clone(),
            session.clone(),
            self.history_limit,
        ));

        Ok(Connection {
            room,
            session,
            inbox,
        })
    }
}

/// Push persisted messages stamped before the session joined, oldest first,
/// onto the session's own queue. Never goes through the room.
///
/// Failures are logged; the connection carries on without history.
async fn replay_history(
    store: Arc<dyn MessageStore>,
    session: Session,
    limit: Option<usize>,
) -> usize {
    let board_id = session.board_id().clone();
    let history = match store.fetch_history(&board_id, limit).await {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!("Failed to fetch history for board '{}': {}", board_id, e);
            return 0;
        }
    };

    let cutoff = session.joined_at();
    let mut replayed = 0;
    for stored in history.into_iter().filter(|m| m.created_at < cutoff) {
        if session
            .deliver(stored.into_history(board_id.clone()))
            .await
            .is_err()
        {
            tracing::debug!("Session {} closed during history replay", session.id());
            break;
        }
        replayed += 1;
    }

    tracing::info!(
        "Replayed {} history messages to session {} on board '{}'",
        replayed,
        session.id(),
        board_id
    );
    replayed
}
