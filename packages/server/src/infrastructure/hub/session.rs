//! One connected participant.

use std::sync::Arc;

use crate::domain::{BoardId, ChatMessage, Identity, SessionId, Timestamp};

use super::outbox::{Inbox, Outbox, PushError, outbox};

/// A connected participant as seen by its room.
///
/// Identity and board are fixed at construction from server-validated input.
/// Clones share the same outbound queue.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    board_id: BoardId,
    identity: Identity,
    joined_at: Timestamp,
    outbox: Outbox,
}

impl Session {
    /// Create a session and the inbox its outbound pump will drain.
    pub fn new(
        board_id: BoardId,
        identity: Identity,
        joined_at: Timestamp,
        capacity: usize,
    ) -> (Self, Inbox) {
        let (outbox, inbox) = outbox(capacity);
        let session = Self {
            id: SessionId::generate(),
            board_id,
            identity,
            joined_at,
            outbox,
        };
        (session, inbox)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn joined_at(&self) -> Timestamp {
        self.joined_at
    }

    /// Queue a message privately for this session, waiting for room in the
    /// queue. Bypasses the room; used for history replay.
    pub async fn deliver(&self, message: ChatMessage) -> Result<(), PushError> {
        self.outbox.push(Arc::new(message)).await
    }

    pub(crate) fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn is_closed(&self) -> bool {
        self.outbox.is_closed()
    }
}
