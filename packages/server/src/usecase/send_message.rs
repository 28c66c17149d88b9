//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - サーバー側でのフィールド上書き、永続化、ブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信者 ID・メール・ボード ID・タイムスタンプがクライアントの値で偽装できないことを保証
//! - 永続化の失敗がブロードキャストを妨げないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト（送信者自身にも届く）
//! - 異常系：ストアの書き込み失敗、ルーム停止後の送信

use std::sync::Arc;

use boardchat_shared::time::Clock;

use crate::{
    domain::{ChatMessage, IncomingMessage, MessageStore, Timestamp},
    infrastructure::hub::{RoomHandle, Session},
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// 永続化先（書き込みは fire-and-forget）
    store: Arc<dyn MessageStore>,
    /// サーバー時刻
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(store: Arc<dyn MessageStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `room` - 送信者が参加しているルーム
    /// * `session` - 送信者のセッション（ID・ボードはここから取る）
    /// * `incoming` - クライアントが送ってきた種別と本文
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<ChatMessage>)` - ブロードキャストしたメッセージ
    /// * `Err(SendMessageError)` - ルームが既に停止している
    pub fn execute(
        &self,
        room: &RoomHandle,
        session: &Session,
        incoming: IncomingMessage,
    ) -> Result<Arc<ChatMessage>, SendMessageError> {
        let message = Arc::new(ChatMessage::stamped(
            incoming.kind,
            incoming.content,
            session.board_id().clone(),
            session.identity(),
            Timestamp::new(self.clock.now_millis()),
        ));

        self.persist(message.clone());
        room.broadcast(message.clone())?;

        tracing::debug!(
            "Broadcast message from '{}' on board '{}'",
            message.sender_id,
            message.board_id
        );
        Ok(message)
    }

    fn persist(&self, message: Arc<ChatMessage>) {
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.append(&message).await {
                tracing::warn!(
                    "Failed to persist message from '{}' on board '{}': {}",
                    message.sender_id,
                    message.board_id,
                    e
                );
            }
        });
    }
}
