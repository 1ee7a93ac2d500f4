//! The `Transport` trait: anything that can answer a JSON-RPC request.
//!
//! [`HttpTransport`](crate::HttpTransport) is the bundled implementation;
//! injected wallet providers and test doubles implement it directly.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// An EIP-1193 style `request(method, params)` provider.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the `result` member of the response.
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError>;

    /// The endpoint URL or provider name, for logs.
    fn url(&self) -> &str;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        (**self).request(method, params).await
    }

    fn url(&self) -> &str {
        (**self).url()
    }
}
