//! Envelopes for the single requests [`HttpTransport`](crate::HttpTransport)
//! posts and the responses it reads back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const JSONRPC_VERSION: &str = "2.0";

/// Response id as echoed by the node. Some providers answer with a string
/// even when sent a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(u64),
    String(String),
    Null,
}

impl RpcId {
    /// `true` if this id answers the numeric request id `sent`.
    pub fn answers(&self, sent: u64) -> bool {
        match self {
            Self::Number(n) => *n == sent,
            Self::String(s) => s.parse::<u64>().is_ok_and(|n| n == sent),
            Self::Null => false,
        }
    }
}

impl fmt::Display for RpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Null => f.write_str("null"),
        }
    }
}

/// Outgoing request. Borrows the method name from the caller; only ever
/// serialized.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Vec<Value>,
    pub id: u64,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id,
        }
    }
}

/// The `error` member of a failed response. Reverts from `eth_call` carry
/// the revert payload in `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<RpcId>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// The result, or the node's error. A response with neither is a null
    /// result (e.g. an unknown transaction receipt).
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }

    /// `false` only when the node echoed an id other than `sent`. Error
    /// responses to unparseable requests may carry a null id.
    pub fn answers(&self, sent: u64) -> bool {
        match &self.id {
            None | Some(RpcId::Null) => self.error.is_some(),
            Some(id) => id.answers(sent),
        }
    }
}
