//! Infrastructure layer: the in-memory hub and concrete collaborators.

pub mod dto;
pub mod hub;
pub mod identity;
pub mod store;
pub mod supabase;
