//! chaincall-rpc: JSON-RPC transport and a typed client for contract calls,
//! transactions, logs and wallet requests.
//!
//! # Overview
//!
//! - [`Transport`]: the async trait a provider implements
//! - [`HttpTransport`]: `reqwest`-backed transport with timeouts and retry
//! - [`Chain`]: typed wrappers over `eth_*` and `wallet_*` methods
//! - [`ens`]: batch reverse resolution and namehash
//! - [`networks`]: `wallet_addEthereumChain` presets
//! - [`ClientConfig`] / [`init_tracing`]: YAML/JSON config and log setup

pub mod chain;
pub mod config;
pub mod ens;
pub mod error;
pub mod http;
pub mod networks;
pub mod request;
pub mod retry;
pub mod transport;
pub mod types;

pub use chain::Chain;
pub use config::{init_tracing, ClientConfig, LogConfig};
pub use ens::{namehash, reverse_lookup, ReverseRecords};
pub use error::{ChainError, TransportError};
pub use http::{HttpConfig, HttpTransport};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use retry::RetryPolicy;
pub use transport::Transport;
pub use types::{
    AddEthereumChainParameter, Block, BlockTag, BlockTransaction, LogItem, LogQuery,
    NativeCurrency, Transaction, TransactionReceipt, TransactionRequest,
};
