//! Error types for spec construction, ABI encoding/decoding and signature
//! verification.

use thiserror::Error;

/// Errors raised by the ChainCall ABI layer.
///
/// Every error is raised at the point of the offending operation and
/// propagated unchanged; nothing in the ABI layer retries or substitutes a
/// default value.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("Invalid spec for {context}: field '{field}': {reason}")]
    InvalidSpec {
        context: String,
        field: String,
        reason: String,
    },

    #[error("Unsupported type: {tag}")]
    UnsupportedType { tag: String },

    #[error("Unknown boolean: {got}")]
    InvalidBoolean { got: String },

    #[error("Cannot filter on \"{field}\" as it is not an indexed event parameter")]
    NotIndexed { field: String },

    #[error("Invalid signature: {reason}")]
    InvalidSignature { reason: String },

    #[error("Missing value for field '{field}'")]
    MissingField { field: String },

    #[error("Missing topic for indexed field '{field}'")]
    MissingTopic { field: String },

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Length mismatch: {types} types, {values} values")]
    LengthMismatch { types: usize, values: usize },

    #[error("Invalid hex '{input}': {reason}")]
    InvalidHex { input: String, reason: String },

    #[error("ABI decode failed: {reason}")]
    AbiDecodeFailed { reason: String },

    #[error("ABI encode failed: {reason}")]
    AbiEncodeFailed { reason: String },

    #[error("Invalid typed data: {reason}")]
    InvalidTypedData { reason: String },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AbiError {
    pub fn invalid_spec(
        context: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSpec {
            context: context.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}
