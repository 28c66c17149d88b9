//! Epoch-millisecond timestamps and the clock the server stamps messages with.
//!
//! Every timestamp on the wire and in storage is Unix epoch milliseconds, UTC.

use chrono::{DateTime, TimeZone, Utc};

/// Source of "now" for server-assigned timestamps.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        get_timestamp_millis()
    }
}

/// A clock stuck at one instant, for deterministic stamping in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    at_millis: i64,
}

impl FixedClock {
    pub fn new(at_millis: i64) -> Self {
        Self { at_millis }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.at_millis
    }
}

/// Get current Unix timestamp (milliseconds)
pub fn get_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert Unix timestamp (milliseconds) to RFC 3339 format (UTC)
///
/// Returns `None` when the timestamp is outside the range chrono can represent.
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> Option<String> {
    Utc.timestamp_millis_opt(timestamp_millis)
        .single()
        .map(|dt| dt.to_rfc3339())
}

/// Parse an RFC 3339 string (any offset) into Unix milliseconds
pub fn rfc3339_to_timestamp(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.timestamp_millis())
}
