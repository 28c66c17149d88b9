//! Process-wide directory of rooms, keyed by board.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use crate::{config::RoomConfig, domain::BoardId};

use super::{
    room::{RetireRequest, Room, RoomError, RoomHandle},
    session::Session,
};

type Rooms = Arc<Mutex<HashMap<BoardId, RoomHandle>>>;

/// Directory mapping board ids to running rooms.
///
/// At most one room exists per board. The lock only guards lookup-or-insert
/// (and removal on retirement); room loops run outside it.
pub struct Hub {
    rooms: Rooms,
    retire: mpsc::UnboundedSender<RetireRequest>,
    config: RoomConfig,
    cancel: CancellationToken,
}

impl Hub {
    /// Create an empty hub. Must be called inside a Tokio runtime.
    pub fn new(config: RoomConfig) -> Self {
        let rooms: Rooms = Arc::new(Mutex::new(HashMap::new()));
        let (retire, requests) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        tokio::spawn(reap_rooms(rooms.clone(), requests, cancel.clone()));

        Self {
            rooms,
            retire,
            config,
            cancel,
        }
    }

    /// Return the room for `board_id`, opening it on first access.
    pub async fn get_room(&self, board_id: &BoardId) -> RoomHandle {
        let mut rooms = self.rooms.lock().await;
        self.get_or_open(&mut rooms, board_id)
    }

    /// Register `session` with the room of its board.
    ///
    /// Lookup and registration happen in one critical section, so a room that
    /// is retiring never receives a new member.
    pub async fn join(&self, session: Session) -> Result<RoomHandle, RoomError> {
        let mut rooms = self.rooms.lock().await;
        let room = self.get_or_open(&mut rooms, session.board_id());
        room.register(session)?;
        Ok(room)
    }

    /// Room for `board_id` if one is running. Never opens a room.
    pub async fn find(&self, board_id: &BoardId) -> Option<RoomHandle> {
        let rooms = self.rooms.lock().await;
        rooms.get(board_id).filter(|room| !room.is_closed()).cloned()
    }

    /// Every running room, ordered by board id.
    pub async fn rooms(&self) -> Vec<RoomHandle> {
        let rooms = self.rooms.lock().await;
        let mut handles: Vec<RoomHandle> = rooms
            .values()
            .filter(|room| !room.is_closed())
            .cloned()
            .collect();
        handles.sort_by(|a, b| a.board_id().cmp(b.board_id()));
        handles
    }

    /// Stop every room. Members' queues are closed, which ends their sessions.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn get_or_open(
        &self,
        rooms: &mut HashMap<BoardId, RoomHandle>,
        board_id: &BoardId,
    ) -> RoomHandle {
        if let Some(room) = rooms.get(board_id).filter(|room| !room.is_closed()) {
            return room.clone();
        }

        let room = Room::spawn(
            board_id.clone(),
            self.config,
            self.retire.clone(),
            self.cancel.child_token(),
        );
        rooms.insert(board_id.clone(), room.clone());
        room
    }
}

impl Drop for Hub {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Answer retire requests from idle rooms.
///
/// A room may go only when no registration is in flight for it. Registrations
/// through [`Hub::join`] are counted under the directory lock, which is also
/// held here, so none can slip in after the key is removed.
async fn reap_rooms(
    rooms: Rooms,
    mut requests: mpsc::UnboundedReceiver<RetireRequest>,
    cancel: CancellationToken,
) {
    loop {
        let request = tokio::select! {
            _ = cancel.cancelled() => break,
            request = requests.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };

        let board_id = request.room.board_id().clone();
        let retired = {
            let mut rooms = rooms.lock().await;
            if request.room.pending_registers() > 0 {
                false
            } else {
                if rooms
                    .get(&board_id)
                    .is_some_and(|current| current.same_room(&request.room))
                {
                    rooms.remove(&board_id);
                }
                true
            }
        };

        if retired {
            tracing::info!("Room '{}' retired after idle timeout", board_id);
        }
        let _ = request.reply.send(retired);
    }
}
