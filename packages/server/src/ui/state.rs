//! Server state shared by every handler.

use std::sync::Arc;

use boardchat_shared::time::Clock;

use crate::{
    config::ChatConfig,
    domain::{IdentityValidator, MessageStore},
    infrastructure::hub::Hub,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetRoomDetailUseCase,
        GetRoomsUseCase, SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// Timeouts and limits for the connection pumps
    pub config: ChatConfig,
    pub(crate) hub: Arc<Hub>,
}

impl AppState {
    /// Wire the use cases around one hub.
    pub fn new(
        hub: Arc<Hub>,
        identity_validator: Arc<dyn IdentityValidator>,
        store: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
        config: ChatConfig,
    ) -> Self {
        Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                hub.clone(),
                identity_validator,
                store.clone(),
                clock.clone(),
                &config,
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new()),
            send_message_usecase: Arc::new(SendMessageUseCase::new(store, clock)),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(hub.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(hub.clone())),
            config,
            hub,
        }
    }

    /// The hub all use cases share.
    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }
}
