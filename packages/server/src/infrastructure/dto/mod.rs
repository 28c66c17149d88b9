//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `websocket`: frames exchanged with chat clients
//! - `http`: introspection API responses
//! - `rest`: rows and payloads of the managed store

pub mod conversion;
pub mod http;
pub mod rest;
pub mod websocket;
