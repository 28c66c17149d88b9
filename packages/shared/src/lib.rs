//! Utilities shared by the boardchat binaries and libraries.

pub mod logger;
pub mod time;
