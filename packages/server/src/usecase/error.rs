//! UseCase error types.

use thiserror::Error;

use crate::{domain::IdentityError, infrastructure::hub::RoomError};

/// Errors while establishing a chat connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// A required query parameter is absent or blank
    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),

    /// The identity validator refused the credentials
    #[error("unauthorized: {0}")]
    Unauthorized(IdentityError),

    /// The board's room stopped before the session could join
    #[error(transparent)]
    Room(#[from] RoomError),
}

/// Errors while sending a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error(transparent)]
    Room(#[from] RoomError),
}

/// Errors while looking up one room
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("no active room for board '{0}'")]
    RoomNotFound(String),
}
