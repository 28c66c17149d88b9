//! Identity taken as-is from the connection parameters.
//!
//! Suitable when an upstream proxy already authenticated the request.

use async_trait::async_trait;

use crate::domain::{Credentials, Identity, IdentityError, IdentityValidator, UserId};

#[derive(Debug, Clone, Copy, Default)]
pub struct TrustedQueryIdentity;

#[async_trait]
impl IdentityValidator for TrustedQueryIdentity {
    async fn validate(&self, credentials: &Credentials) -> Result<Identity, IdentityError> {
        let user_id = credentials
            .user_id
            .clone()
            .and_then(|id| UserId::new(id).ok())
            .ok_or(IdentityError::MissingCredential("user_id"))?;
        let email = credentials.email.clone().unwrap_or_default();
        Ok(Identity::new(user_id, email))
    }
}
