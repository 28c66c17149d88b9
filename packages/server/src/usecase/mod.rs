//! UseCase layer: what the transport handlers ask the chat core to do.

mod connect_participant;
mod disconnect_participant;
mod error;
mod get_room_detail;
mod get_rooms;
mod send_message;

pub use connect_participant::{ConnectParticipantUseCase, ConnectRequest, Connection};
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, GetRoomDetailError, SendMessageError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::{GetRoomsUseCase, RoomSnapshot};
pub use send_message::SendMessageUseCase;
