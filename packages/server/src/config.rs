//! Tunables for the chat core.

use std::time::Duration;

/// Capacity of each session's outbound queue.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;
/// Interval between keepalive pings written to each client.
pub const PING_INTERVAL: Duration = Duration::from_secs(54);
/// Window within which some inbound traffic must arrive.
pub const PONG_WAIT: Duration = Duration::from_secs(60);
/// Upper bound for a single frame write.
pub const WRITE_WAIT: Duration = Duration::from_secs(10);
/// Largest accepted inbound message, in bytes.
pub const MAX_MESSAGE_SIZE: usize = 2048;
/// Upper bound for one request to the managed store or identity service.
pub const STORE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// How long an empty room lingers before it retires.
pub const ROOM_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Runtime configuration of the chat hub and session pumps.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub outbound_capacity: usize,
    pub ping_interval: Duration,
    pub pong_wait: Duration,
    pub write_wait: Duration,
    pub max_message_size: usize,
    /// `None` keeps rooms alive for the lifetime of the process.
    pub room_idle_timeout: Option<Duration>,
    /// Fan out `join`/`leave` notices on membership changes.
    pub presence_notices: bool,
    /// Cap on the number of messages replayed to a joining session.
    pub history_limit: Option<usize>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: OUTBOUND_QUEUE_CAPACITY,
            ping_interval: PING_INTERVAL,
            pong_wait: PONG_WAIT,
            write_wait: WRITE_WAIT,
            max_message_size: MAX_MESSAGE_SIZE,
            room_idle_timeout: Some(ROOM_IDLE_TIMEOUT),
            presence_notices: false,
            history_limit: None,
        }
    }
}

/// Settings the room loops need, extracted from [`ChatConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RoomConfig {
    pub idle_timeout: Option<Duration>,
    pub presence_notices: bool,
}

impl From<&ChatConfig> for RoomConfig {
    fn from(config: &ChatConfig) -> Self {
        Self {
            idle_timeout: config.room_idle_timeout,
            presence_notices: config.presence_notices,
        }
    }
}
