//! UseCase: ルーム詳細取得

use std::sync::Arc;

use crate::{domain::BoardId, infrastructure::hub::Hub};

use super::{error::GetRoomDetailError, get_rooms::RoomSnapshot};

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    hub: Arc<Hub>,
}

impl GetRoomDetailUseCase {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }

    /// Look up a live room without creating one.
    pub async fn execute(&self, board_id: String) -> Result<RoomSnapshot, GetRoomDetailError> {
        let not_found = || GetRoomDetailError::RoomNotFound(board_id.clone());
        let id = BoardId::new(board_id.clone()).map_err(|_| not_found())?;
        let room = self.hub.find(&id).await.ok_or_else(not_found)?;
        RoomSnapshot::capture(&room).await.ok_or_else(not_found)
    }
}
