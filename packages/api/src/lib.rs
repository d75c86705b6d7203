#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! REST client for `/api/d2d/*`.
//!
//! [`ApiClient`] implements [`roofing_d2d::D2dBackend`] over `reqwest`. A
//! [`Session`] supplies the bearer token; any 401 or 403 clears it and
//! surfaces as [`ApiError::SessionExpired`].

pub mod client;
pub mod config;
pub mod session;
pub mod transport;

use roofing_d2d::BackendError;
use thiserror::Error;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};

/// Errors from the REST client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (token file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// The server rejected the bearer token.
    #[error("Session expired")]
    SessionExpired,

    /// Non-success status that is not an auth failure.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Status code.
        status: u16,
        /// Server message or canonical reason.
        message: String,
    },

    /// The server answered `{"success": false}`.
    #[error("Rejected: {message}")]
    Rejected {
        /// Server-provided reason.
        message: String,
    },
}

impl From<ApiError> for BackendError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::SessionExpired => Self::SessionExpired,
            ApiError::Rejected { message } => Self::Rejected { message },
            other => Self::Transport {
                message: other.to_string(),
            },
        }
    }
}
