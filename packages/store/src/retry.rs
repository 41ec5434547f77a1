//! HTTP retry helper for remote CSV downloads.
//!
//! Transient failures (timeouts, connection resets, HTTP 429 and 5xx) are
//! retried with exponential backoff. Other 4xx responses are permanent and
//! returned immediately.

use std::time::Duration;

use crate::StoreError;

/// Maximum number of retry attempts after the first request.
///
/// With backoff of 2s, 4s, 8s the total wait before giving up is 14
/// seconds.
pub const MAX_RETRIES: u32 = 3;

/// Sends the request built by `build_request` and returns the body bytes.
///
/// The closure is called once per attempt because a
/// [`reqwest::RequestBuilder`] is consumed by `send()`.
///
/// # Errors
///
/// Returns [`StoreError::Http`] or [`StoreError::Unavailable`] once all
/// retries are exhausted or a permanent error status is returned.
#[allow(clippy::future_not_send)]
pub async fn send_bytes<F>(build_request: F, max_retries: u32) -> Result<Vec<u8>, StoreError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<StoreError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    last_error = Some(StoreError::Http(e));
                    continue;
                }
                return Err(StoreError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    last_error = Some(StoreError::Unavailable {
                        message: format!("HTTP {status} from {}", response.url()),
                    });
                    if attempt < max_retries {
                        log::warn!("  HTTP {status}");
                        continue;
                    }
                    break;
                }

                if status.is_client_error() {
                    return Err(StoreError::Unavailable {
                        message: format!("HTTP {status} from {}", response.url()),
                    });
                }

                let bytes = response.bytes().await?;
                return Ok(bytes.to_vec());
            }
        }
    }

    Err(last_error.unwrap_or_else(|| StoreError::Unavailable {
        message: "request failed after all retries".to_string(),
    }))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}
