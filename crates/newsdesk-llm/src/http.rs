//! Request plumbing shared by the HTTP backends

use newsdesk_domain::ProviderError;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Instruction sent as the system turn to chat-style backends
pub(crate) const SYSTEM_INSTRUCTION: &str = "You extract structured fields from news articles. \
Answer with a single JSON object using exactly the keys you are given and nothing else.";

/// Build a blocking HTTP client with the backend's timeout
pub(crate) fn build_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NotConfigured(format!("Failed to build HTTP client: {}", e)))
}

/// Map a transport-level failure onto the provider error kinds
pub(crate) fn map_reqwest_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else if e.is_decode() {
        ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
    } else {
        ProviderError::Communication(format!("Request failed: {}", e))
    }
}

/// Map a non-success HTTP status onto the provider error kinds
pub(crate) fn status_error(status: StatusCode, body: String, model: &str) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded,
        StatusCode::NOT_FOUND => ProviderError::ModelNotAvailable(model.to_string()),
        _ => ProviderError::Rejected {
            status: status.as_u16(),
            message: truncate(&body, 500),
        },
    }
}

/// Turn a response into its JSON body or a status error
pub(crate) fn read_json<T>(response: Response, model: &str) -> Result<T, ProviderError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(status_error(status, body, model));
    }
    response.json::<T>().map_err(map_reqwest_error)
}

/// Reject requests over the backend's input limit
pub(crate) fn check_input(request: &str, max_chars: usize) -> Result<(), ProviderError> {
    let len = request.chars().count();
    if len > max_chars {
        return Err(ProviderError::InputTooLong { len, max: max_chars });
    }
    Ok(())
}

/// Treat a whitespace-only answer as a failure
pub(crate) fn non_empty(answer: String) -> Result<String, ProviderError> {
    if answer.trim().is_empty() {
        Err(ProviderError::EmptyAnswer)
    } else {
        Ok(answer)
    }
}

/// Run `attempt` up to `max_attempts` times, backing off exponentially
///
/// Only transient errors are retried; everything else returns immediately.
pub(crate) fn with_retries<F>(
    max_attempts: u32,
    backoff: Duration,
    mut attempt: F,
) -> Result<String, ProviderError>
where
    F: FnMut() -> Result<String, ProviderError>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;
        match attempt() {
            Ok(answer) => return Ok(answer),
            Err(e) if e.is_transient() && attempts < max_attempts => {
                // Exponential backoff: base, 2x base, 4x base, ...
                let delay = backoff * 2u32.pow(attempts - 1);
                warn!("Attempt {}/{} failed ({}), retrying in {:?}", attempts, max_attempts, e, delay);
                thread::sleep(delay);
            }
            Err(e) => {
                debug!("Giving up after {} attempt(s): {}", attempts, e);
                return Err(e);
            }
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
