//! Configured request client
//!
//! Owns the `reqwest` client, resolves endpoint paths against the configured
//! base URL and runs the middleware chain around every call.

use crate::config::ClientConfig;
use crate::errors::{ClientError, Result};
use crate::http::middleware::{BearerAuth, BlockDetection, Middleware};
use crate::http::ApiRequest;
use crate::session::SessionStore;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// HTTP client wrapper with the auth and block-detection policy installed
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: Arc<ClientConfig>,
    session: SessionStore,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.api_base_url)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

impl ApiClient {
    /// Create a client bound to `session`, with bearer auth and block detection.
    pub fn new(config: ClientConfig, session: SessionStore) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            config: Arc::new(config),
            middleware: vec![
                Arc::new(BearerAuth::new(session.clone())),
                Arc::new(BlockDetection::new(session.clone())),
            ],
            session,
        })
    }

    /// Append a middleware after the built-in ones.
    pub fn with_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Execute a request and decode its JSON body.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Execute a request and discard the body.
    pub async fn execute_unit(&self, request: ApiRequest) -> Result<()> {
        self.send(request).await.map(drop)
    }

    /// Send a request through the middleware chain.
    ///
    /// Non-success statuses become [`ClientError::Http`]. Failure observers run
    /// before the error is returned unchanged.
    pub async fn send(&self, request: ApiRequest) -> Result<Response> {
        let builder = self.build(&request);

        tracing::debug!(method = %request.method, path = %request.path, "sending request");
        let outcome = dispatch(builder).await;

        if let Err(error) = &outcome {
            for middleware in &self.middleware {
                middleware.on_failure(&request, error);
            }
        }
        outcome
    }

    fn build(&self, request: &ApiRequest) -> RequestBuilder {
        let url = self.config.endpoint_url(&request.path);
        let mut builder = self.http.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        self.middleware
            .iter()
            .fold(builder, |builder, middleware| middleware.on_request(request, builder))
    }
}

async fn dispatch(builder: RequestBuilder) -> Result<Response> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response body".to_string());
    Err(ClientError::from_response(status.as_u16(), body))
}
