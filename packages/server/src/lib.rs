//! Real-time chat for task boards.
//!
//! Every board gets its own room. Participants connect over WebSocket, see
//! each other's messages live, and receive the board's stored history
//! privately when they join.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
