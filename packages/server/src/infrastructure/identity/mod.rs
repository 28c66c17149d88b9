//! `IdentityValidator` implementations.

mod supabase;
mod trusted;

pub use supabase::SupabaseIdentityValidator;
pub use trusted::TrustedQueryIdentity;
