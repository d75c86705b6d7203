//! Client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::ApiError;
use crate::session::{FileTokenStore, MemoryTokenStore, Session};

/// Overrides `base_url`.
pub const ENV_API_URL: &str = "ROOFING_API_URL";
/// Seeds the session with a bearer token.
pub const ENV_API_TOKEN: &str = "ROOFING_API_TOKEN";
/// Persists the bearer token in this file.
pub const ENV_TOKEN_PATH: &str = "ROOFING_TOKEN_PATH";

/// Connection settings for [`crate::ApiClient`]. Missing keys take
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Origin the `/api/d2d/*` paths are appended to.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// File the bearer token is kept in. In-memory when unset.
    pub token_path: Option<PathBuf>,
    /// Token to start the session with.
    #[serde(skip)]
    pub token: Option<String>,
    /// Extra attempts for a `GET` that failed transiently.
    pub max_retries: u32,
    /// Backoff before the first retry; doubles each attempt.
    pub retry_base_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
            token_path: None,
            token: None,
            max_retries: 2,
            retry_base_ms: 500,
        }
    }
}

impl ApiConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the document is malformed.
    pub fn from_toml_str(text: &str) -> Result<Self, ApiError> {
        Ok(toml::de::from_str(text)?)
    }

    /// Reads a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Io`] or [`ApiError::Config`].
    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Applies `ROOFING_API_URL`, `ROOFING_API_TOKEN` and
    /// `ROOFING_TOKEN_PATH` from the process environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides resolved through `lookup`. Empty values are
    /// ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.base_url = url;
        }
        if let Some(token) = get(ENV_API_TOKEN) {
            self.token = Some(token);
        }
        if let Some(path) = get(ENV_TOKEN_PATH) {
            self.token_path = Some(PathBuf::from(path));
        }
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn retry_base(&self) -> Duration {
        Duration::from_millis(self.retry_base_ms)
    }

    /// Builds the session described by this config, seeding it with
    /// `token` if one is set.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Io`] if the seed token cannot be written.
    pub fn session(&self) -> Result<Session, ApiError> {
        let session = match &self.token_path {
            Some(path) => Session::new(FileTokenStore::new(path.clone())),
            None => Session::new(MemoryTokenStore::default()),
        };
        if let Some(token) = &self.token {
            session.login(token)?;
        }
        Ok(session)
    }
}
