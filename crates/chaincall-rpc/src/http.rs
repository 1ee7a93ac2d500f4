//! HTTP JSON-RPC transport backed by `reqwest`.
//!
//! Features:
//! - Monotonically increasing request ids
//! - Per-request timeout
//! - Retry with exponential backoff for transient errors (HTTP failures,
//!   timeouts); node-side JSON-RPC errors are returned immediately

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::retry::RetryPolicy;
use crate::transport::Transport;

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ClientConfig> for HttpConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            retry: config.retry_policy(),
            request_timeout: config.request_timeout(),
        }
    }
}

pub struct HttpTransport {
    url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
    request_timeout: Duration,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Create a transport for the given endpoint URL.
    ///
    /// # Errors
    /// `Http` if the underlying client cannot be built (e.g. TLS backend
    /// initialisation fails).
    pub fn new(url: impl Into<String>, config: HttpConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            retry: config.retry,
            request_timeout: config.request_timeout,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::new(config.rpc_url.clone(), HttpConfig::from(config))
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn send_once(&self, req: &JsonRpcRequest<'_>) -> Result<JsonRpcResponse, TransportError> {
        let resp = self
            .http
            .post(&self.url)
            .json(req)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        let body = resp
            .json::<JsonRpcResponse>()
            .await
            .map_err(|e| self.classify(e))?;
        if !body.answers(req.id) {
            return Err(TransportError::Other(format!(
                "response id {:?} does not match request id {}",
                body.id, req.id
            )));
        }
        Ok(body)
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else if e.is_decode() {
            TransportError::Other(format!("malformed JSON-RPC response: {e}"))
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        let req = JsonRpcRequest::new(self.next_id(), method, params);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.send_once(&req).await {
                Ok(resp) => {
                    tracing::trace!(id = %req.id, method, "rpc response");
                    return resp.into_result().map_err(TransportError::Rpc);
                }
                Err(e) if e.is_retryable() => match self.retry.next_delay(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            url = %self.url,
                            method,
                            "retrying request"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::error!(
                            attempt,
                            error = %e,
                            url = %self.url,
                            method,
                            "max retries exceeded"
                        );
                        return Err(e);
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }

    fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase() {
        let t = HttpTransport::new("http://127.0.0.1:8545", HttpConfig::default()).unwrap();
        let a = t.next_id();
        let b = t.next_id();
        assert!(b > a);
    }

    #[test]
    fn config_carries_retry_policy() {
        let mut cfg = ClientConfig::new("http://127.0.0.1:8545");
        cfg.max_retries = 7;
        cfg.request_timeout_ms = 1_500;
        let http = HttpConfig::from(&cfg);
        assert_eq!(http.retry.max_retries, 7);
        assert_eq!(http.request_timeout, Duration::from_millis(1_500));
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_after_retries() {
        let t = HttpTransport::new(
            "http://127.0.0.1:9",
            HttpConfig {
                retry: RetryPolicy {
                    max_retries: 1,
                    initial_backoff: Duration::from_millis(1),
                    max_backoff: Duration::from_millis(1),
                },
                request_timeout: Duration::from_millis(500),
            },
        )
        .unwrap();
        let err = t.request("eth_blockNumber", vec![]).await.unwrap_err();
        assert!(err.is_retryable(), "{err}");
    }
}
