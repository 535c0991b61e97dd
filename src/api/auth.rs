//! Login exchange

use crate::bootstrap::AuthBackend;
use crate::errors::{ClientError, Result};
use crate::http::{ApiClient, ApiRequest};
use crate::models::{LoginRequest, LoginResponse};
use async_trait::async_trait;

impl ApiClient {
    /// Exchange host-signed init data for a bearer token.
    ///
    /// Any rejection is reported as [`ClientError::Auth`]; the caller collapses
    /// it with environment errors. An empty token in a successful response is
    /// a rejection too.
    pub async fn login(&self, init_data: &str) -> Result<String> {
        let request = ApiRequest::post("/auth/login").json(&LoginRequest { init_data })?;

        let response: LoginResponse = self.execute(request).await.map_err(|e| match e {
            ClientError::Http { .. } => ClientError::auth(e.to_string()),
            other => other,
        })?;

        if response.access_token.trim().is_empty() {
            return Err(ClientError::auth("backend returned an empty access token"));
        }
        Ok(response.access_token)
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, init_data: &str) -> Result<String> {
        ApiClient::login(self, init_data).await
    }
}
