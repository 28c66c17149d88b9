//! `MessageStore` implementations.

mod inmemory;
mod supabase;

pub use inmemory::InMemoryMessageStore;
pub use supabase::SupabaseMessageStore;
