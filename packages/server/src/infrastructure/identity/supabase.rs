//! Identity verified against Supabase Auth with the user's bearer token.

use async_trait::async_trait;

use crate::{
    domain::{Credentials, Identity, IdentityError, IdentityValidator},
    infrastructure::{
        dto::rest::AuthUser,
        supabase::{SupabaseClient, check_status},
    },
};

pub struct SupabaseIdentityValidator {
    client: SupabaseClient,
}

impl SupabaseIdentityValidator {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityValidator for SupabaseIdentityValidator {
    async fn validate(&self, credentials: &Credentials) -> Result<Identity, IdentityError> {
        let token = credentials
            .bearer_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(IdentityError::MissingCredential("token"))?;

        let response = self
            .client
            .auth("user", token)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        let response = check_status(response)
            .await
            .map_err(|(status, body)| match status {
                401 | 403 => IdentityError::Rejected(body),
                _ => IdentityError::Unavailable(format!("status {}: {}", status, body)),
            })?;
        let user: AuthUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        let identity =
            Identity::try_from(user).map_err(|e| IdentityError::Rejected(e.to_string()))?;

        verify_claim(credentials, identity)
    }
}

/// A user id supplied next to the token must name the token's owner.
fn verify_claim(credentials: &Credentials, identity: Identity) -> Result<Identity, IdentityError> {
    if let Some(claimed) = credentials.user_id.as_deref().map(str::trim)
        && !claimed.is_empty()
        && claimed != identity.user_id.as_str()
    {
        return Err(IdentityError::Mismatch {
            claimed: claimed.to_string(),
            actual: identity.user_id.into_string(),
        });
    }
    Ok(identity)
}
