//! Minimal client for a Supabase project (PostgREST + GoTrue).

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};

/// Connection settings shared by the Supabase-backed collaborators.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    /// Every request made through the client fails once `timeout` elapses.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Request against a REST table, authenticated with the service key.
    pub(crate) fn rest(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Request against the auth API on behalf of a user token.
    pub(crate) fn auth(&self, path: &str, user_token: &str) -> RequestBuilder {
        self.http
            .get(format!("{}/auth/v1/{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .bearer_auth(user_token)
    }
}

/// Split a response into success or `(status, body)`.
pub(crate) async fn check_status(response: Response) -> Result<Response, (u16, String)> {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let body = response.text().await.unwrap_or_default();
        return Err((status.as_u16(), body));
    }
    Ok(response)
}
