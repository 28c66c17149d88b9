//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::{
    domain::BoardId,
    infrastructure::hub::{Hub, MemberInfo, RoomHandle},
};

/// A point-in-time view of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub board_id: BoardId,
    /// Ordered by join time.
    pub members: Vec<MemberInfo>,
}

impl RoomSnapshot {
    /// Ask the room loop for its member list. `None` if the room has stopped.
    pub(crate) async fn capture(room: &RoomHandle) -> Option<Self> {
        let members = room.members().await.ok()?;
        Some(Self {
            board_id: room.board_id().clone(),
            members,
        })
    }
}

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    hub: Arc<Hub>,
}

impl GetRoomsUseCase {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }

    /// Every live room, ordered by board id. Rooms that stop mid-listing are skipped.
    pub async fn execute(&self) -> Vec<RoomSnapshot> {
        let mut snapshots = Vec::new();
        for room in self.hub.rooms().await {
            if let Some(snapshot) = RoomSnapshot::capture(&room).await {
                snapshots.push(snapshot);
            }
        }
        snapshots
    }
}
