//! HTTP client wrapper.
//!
//! Every request goes through [`ApiClient`], which runs the middleware chain:
//! [`BearerAuth`] decorates outgoing requests with the current token and
//! [`BlockDetection`] observes failed responses for the block signal before
//! the error is handed back to the caller unchanged.

pub mod client;
pub mod middleware;

pub use client::ApiClient;
pub use middleware::{BearerAuth, BlockDetection, Middleware};

use reqwest::Method;
use serde::Serialize;

/// How an HTTP 403 on this request is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForbiddenScope {
    /// Any 403 means the account is blocked.
    #[default]
    Account,
    /// A 403 is a permission denial for this item only; only the explicit
    /// blocked marker in the body signals a block.
    Item,
}

/// Description of one backend call, independent of the transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub forbidden_scope: ForbiddenScope,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            forbidden_scope: ForbiddenScope::Account,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a query parameter only when `value` is present.
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: &impl Serialize) -> crate::errors::Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Treat a 403 on this request as an item-level permission denial.
    pub fn item_scoped(mut self) -> Self {
        self.forbidden_scope = ForbiddenScope::Item;
        self
    }
}
