//! Request handlers.

mod http;
mod pump;
mod websocket;

pub use http::{get_room_detail, get_rooms, health_check};
pub use pump::{PumpExit, inbound_pump, outbound_pump};
pub use websocket::{ConnectQuery, websocket_handler};
