//! Transport and client error types.

use chaincall_core::AbiError;
use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors raised while moving a request to a node and back.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, bad status, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC error object returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// `true` for transient failures worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }

    /// `true` if the node executed the request and rejected it (e.g. a revert).
    pub fn is_execution_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }
}

/// Errors raised by [`Chain`](crate::Chain) and the ENS helpers.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Abi(#[from] AbiError),

    /// The node answered, but not with the shape the method returns.
    #[error("Unexpected result for {method}: {reason}")]
    UnexpectedResult { method: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChainError {
    pub(crate) fn unexpected(method: &str, reason: impl Into<String>) -> Self {
        Self::UnexpectedResult {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_errors_retry() {
        assert!(TransportError::Http("connection reset".into()).is_retryable());
        assert!(TransportError::Timeout { ms: 100 }.is_retryable());
        let revert = TransportError::Rpc(JsonRpcError {
            code: 3,
            message: "execution reverted".into(),
            data: None,
        });
        assert!(!revert.is_retryable());
        assert!(revert.is_execution_error());
    }

    #[test]
    fn abi_errors_pass_through() {
        let err: ChainError = AbiError::NotIndexed { field: "value".into() }.into();
        assert_eq!(
            err.to_string(),
            "Cannot filter on \"value\" as it is not an indexed event parameter"
        );
    }
}
