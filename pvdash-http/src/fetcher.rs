use std::sync::Arc;
use std::time::Duration;

use pvdash_core::{DashError, RetryConfig, StatusSink};
use rand::Rng;
use reqwest::{Client, RequestBuilder, Response};

/// Delay with up to `jitter_percent` of random extra on top of `base_ms`.
pub fn jitter_wait(base_ms: u64, jitter_percent: u32) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, (base_ms.saturating_mul(u64::from(jitter_percent))) / 100)
    };
    let mut rng = rand::rng();
    base_ms + rng.random_range(0..jitter_range)
}

/// HTTP client wrapper that retries non-success responses within a budget.
///
/// Transport errors (connection refused, reset, TLS) consume the same budget
/// as non-2xx responses. When the budget is exhausted the last failure is
/// posted to the status sink with the error tag and returned as
/// [`DashError::Network`], carrying the URL and the response body.
pub struct RetryingFetcher {
    client: Client,
    retry: RetryConfig,
    status: Arc<dyn StatusSink>,
}

impl RetryingFetcher {
    /// Wrap `client` with the given retry budget.
    pub fn new(client: Client, retry: RetryConfig, status: Arc<dyn StatusSink>) -> Self {
        Self {
            client,
            retry,
            status,
        }
    }

    /// Underlying client, for building requests.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Status sink failures are reported to.
    #[must_use]
    pub fn status(&self) -> &Arc<dyn StatusSink> {
        &self.status
    }

    /// Send `request`, retrying until a 2xx response or the budget runs out.
    ///
    /// # Errors
    /// - `InvalidArg` if the request cannot be built or cloned (streaming bodies).
    /// - `Network` with the last status and body once every attempt failed.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pvdash_http::fetcher::send", skip_all, fields(url))
    )]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, DashError> {
        let request = request
            .build()
            .map_err(|e| DashError::InvalidArg(format!("invalid request: {e}")))?;
        let url = request.url().to_string();
        #[cfg(feature = "tracing")]
        tracing::Span::current().record("url", url.as_str());

        let attempts = self.retry.max_attempts.max(1);
        let mut last = DashError::network(&url, None, "no attempt made");
        for attempt in 1..=attempts {
            let req = request
                .try_clone()
                .ok_or_else(|| DashError::InvalidArg(format!("request to {url} is not retryable")))?;
            match self.client.execute(req).await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let body = resp.text().await.unwrap_or_default();
                    last = DashError::network(&url, Some(status), body);
                }
                Err(e) => {
                    last = DashError::network(&url, None, e.to_string());
                }
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt, attempts, error = %last, "request failed");
            if attempt < attempts
                && let Some(backoff) = self.retry.backoff
            {
                let wait = jitter_wait(
                    backoff.base_delay_ms(attempt),
                    u32::from(backoff.jitter_percent),
                );
                tokio::time::sleep(Duration::from_millis(wait)).await;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(error = %last, "retry budget exhausted");
        self.status.error(&last.to_string());
        Err(last)
    }
}
