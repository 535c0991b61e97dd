//! Configuration for the mini app client.
//!
//! Values come from an optional TOML file followed by environment variables
//! prefixed with `SCHEDULE__` (for example `SCHEDULE__API_BASE_URL`), later
//! sources overriding earlier ones.

use crate::errors::{ClientError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix used by [`ClientConfig::load`].
pub const ENV_PREFIX: &str = "SCHEDULE";

/// Main configuration for the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://schedule.example.org`
    pub api_base_url: String,

    /// Path prefix prepended to every endpoint
    pub api_prefix: String,

    /// Quiet period before a typed search is sent
    pub debounce_ms: u64,

    /// Per-request timeout; unset means requests may wait indefinitely
    pub request_timeout_secs: Option<u64>,

    /// Directory holding the persisted session record
    pub storage_dir: Option<PathBuf>,

    /// User agent sent with every request
    pub user_agent: String,

    /// Page sizes for the paginated screens
    pub page_sizes: PageSizes,
}

/// Page sizes requested by each list screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSizes {
    pub homework: u32,
    pub dictionaries: u32,
    pub admin_users: u32,
    pub admin_chats: u32,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            homework: 4,
            dictionaries: 20,
            admin_users: 10,
            admin_chats: 10,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            api_prefix: "/api/v1".to_string(),
            debounce_ms: 500,
            request_timeout_secs: None,
            storage_dir: None,
            user_agent: concat!("schedule-miniapp/", env!("CARGO_PKG_VERSION")).to_string(),
            page_sizes: PageSizes::default(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration pointing at `api_base_url` with default values.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Default::default()
        }
    }

    /// Load configuration from an optional TOML file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Set the path prefix.
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Set the debounce interval.
    pub fn debounce(mut self, delay: Duration) -> Self {
        self.debounce_ms = delay.as_millis() as u64;
        self
    }

    /// Set a per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = Some(timeout.as_secs());
        self
    }

    /// Set the directory used for session persistence.
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    /// Set page sizes.
    pub fn page_sizes(mut self, sizes: PageSizes) -> Self {
        self.page_sizes = sizes;
        self
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Full URL for an endpoint path such as `/profile/me`.
    pub fn endpoint_url(&self, path: &str) -> String {
        let mut url = self.api_base_url.trim_end_matches('/').to_string();
        let prefix = self.api_prefix.trim_end_matches('/');
        if !prefix.is_empty() {
            if !prefix.starts_with('/') {
                url.push('/');
            }
            url.push_str(prefix);
        }
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);
        url
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(ClientError::config("api_base_url must be set"));
        }

        let url = url::Url::parse(&self.api_base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::config(format!(
                "api_base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.debounce_ms == 0 {
            return Err(ClientError::config("debounce_ms must be greater than 0"));
        }

        if self.request_timeout_secs == Some(0) {
            return Err(ClientError::config(
                "request_timeout_secs must be greater than 0 when set",
            ));
        }

        let sizes = self.page_sizes;
        if [
            sizes.homework,
            sizes.dictionaries,
            sizes.admin_users,
            sizes.admin_chats,
        ]
        .contains(&0)
        {
            return Err(ClientError::config("page sizes must be greater than 0"));
        }

        Ok(())
    }
}
