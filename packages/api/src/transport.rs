//! Request execution: bearer auth, status classification and retry.
//!
//! Idempotent reads go through [`send`] with the configured
//! [`RetryPolicy`]; mutations use [`RetryPolicy::NONE`] so a create is
//! never sent twice.
//!
//! | Status | Outcome |
//! |---|---|
//! | 2xx, 3xx | body returned |
//! | 401, 403 | session torn down, [`ApiError::SessionExpired`] |
//! | 429, 5xx | retried, then [`ApiError::Status`] |
//! | other 4xx | [`ApiError::Status`] with the server's message |

use std::time::Duration;

use roofing_api_models::{ApiErrorBody, MutationResponse};
use serde::de::DeserializeOwned;

use crate::ApiError;
use crate::session::Session;

/// How a response status is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    /// Token rejected.
    Unauthorized,
    /// Worth retrying.
    Transient,
    /// Retrying will not help.
    Permanent,
}

/// Classifies an HTTP status code.
#[must_use]
pub const fn classify(status: u16) -> StatusClass {
    match status {
        401 | 403 => StatusClass::Unauthorized,
        429 | 500..=599 => StatusClass::Transient,
        400..=499 => StatusClass::Permanent,
        _ => StatusClass::Success,
    }
}

/// Retry budget for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each one after.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Single attempt.
    pub const NONE: Self = Self {
        max_retries: 0,
        base_delay: Duration::ZERO,
    };

    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
    }
}

/// Sends the request built by `build_request`, attaching the session's
/// bearer token, and returns the response body.
///
/// The builder closure is called once per attempt since
/// [`reqwest::RequestBuilder`] is consumed by `send()`.
///
/// # Errors
///
/// * [`ApiError::SessionExpired`] on 401/403 (the session is cleared)
/// * [`ApiError::Status`] on other 4xx, or 429/5xx once retries run out
/// * [`ApiError::Http`] if the request could not be sent or read
pub async fn send<F>(
    session: &Session,
    build_request: F,
    policy: RetryPolicy,
) -> Result<String, ApiError>
where
    F: Fn() -> reqwest::RequestBuilder + Send + Sync,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = policy.delay(attempt);
            log::warn!("  retry {attempt}/{} in {delay:?}...", policy.max_retries);
            tokio::time::sleep(delay).await;
        }

        let mut request = build_request();
        if let Some(token) = session.bearer() {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if is_transient(&e) && attempt < policy.max_retries => {
                log::warn!("  transient error: {e}");
                attempt += 1;
                continue;
            }
            Err(e) => return Err(ApiError::Http(e)),
        };

        let status = response.status();
        match classify(status.as_u16()) {
            StatusClass::Success => return Ok(response.text().await?),
            StatusClass::Unauthorized => {
                log::warn!("{} answered HTTP {status}", response.url());
                session.teardown();
                return Err(ApiError::SessionExpired);
            }
            StatusClass::Transient if attempt < policy.max_retries => {
                log::warn!("  HTTP {status} from {}", response.url());
                attempt += 1;
            }
            StatusClass::Transient | StatusClass::Permanent => {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    message: error_message(&body, status.canonical_reason()),
                });
            }
        }
    }
}

/// Pulls a human-readable message out of an error body.
#[must_use]
pub fn error_message(body: &str, reason: Option<&str>) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .or_else(|| reason.map(str::to_string))
        .unwrap_or_else(|| "Request failed".to_string())
}

/// Parses a JSON response body.
///
/// # Errors
///
/// Returns [`ApiError::Json`] if the body does not match `T`.
pub fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    Ok(serde_json::from_str(body)?)
}

/// Interprets a mutation envelope, returning the created ID if any.
///
/// An empty body (e.g. `204 No Content`) counts as success.
///
/// # Errors
///
/// Returns [`ApiError::Rejected`] for `"success": false`, or
/// [`ApiError::Json`] for a malformed body.
pub fn parse_mutation(body: &str) -> Result<Option<i64>, ApiError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let response: MutationResponse = parse_json(body)?;
    if let Some(message) = response.failure_message() {
        return Err(ApiError::Rejected {
            message: message.to_string(),
        });
    }
    Ok(response.id)
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}
