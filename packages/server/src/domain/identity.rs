//! Identity validator interface.

use async_trait::async_trait;

use super::{Credentials, Identity, IdentityError};

/// Turns the credentials presented at connect time into a trusted identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityValidator: Send + Sync {
    async fn validate(&self, credentials: &Credentials) -> Result<Identity, IdentityError>;
}
