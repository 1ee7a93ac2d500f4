//! RPC data shapes: logs, log queries, transactions, receipts and blocks.
//!
//! Field names are camelCase on the wire; quantities are `0x` hex strings,
//! which alloy's `U64` / `U256` serde already produce and accept.

use std::fmt;

use alloy_primitives::{B256, U256, U64};
use chaincall_abi::{LogRecord, TopicFilter};
use chaincall_core::Address;
use serde::{Deserialize, Serialize, Serializer};

/// A block reference in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Number(u64),
    Earliest,
    Latest,
    Pending,
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n:#x}"),
            Self::Earliest => f.write_str("earliest"),
            Self::Latest => f.write_str("latest"),
            Self::Pending => f.write_str("pending"),
        }
    }
}

impl Serialize for BlockTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<u64> for BlockTag {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

/// A log as returned by `eth_getLogs` and inside receipts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogItem {
    #[serde(default)]
    pub removed: bool,
    pub log_index: Option<U64>,
    pub transaction_index: Option<U64>,
    pub transaction_hash: Option<B256>,
    pub block_hash: Option<B256>,
    pub block_number: Option<U64>,
    pub address: Address,
    pub data: String,
    pub topics: Vec<String>,
}

impl LogRecord for LogItem {
    fn topics(&self) -> &[String] {
        &self.topics
    }

    fn data(&self) -> &str {
        &self.data
    }
}

/// The filter object of `eth_getLogs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    pub from_block: BlockTag,
    pub to_block: BlockTag,
    /// `null` matches every contract
    pub address: Option<Address>,
    pub topics: TopicFilter,
}

impl LogQuery {
    /// Every matching log from genesis to the latest block.
    pub fn new(topics: TopicFilter) -> Self {
        Self {
            from_block: BlockTag::Earliest,
            to_block: BlockTag::Latest,
            address: None,
            topics,
        }
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn from_block(mut self, block: impl Into<BlockTag>) -> Self {
        self.from_block = block.into();
        self
    }

    pub fn to_block(mut self, block: impl Into<BlockTag>) -> Self {
        self.to_block = block.into();
        self
    }
}

/// The transaction object of `eth_sendTransaction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    pub value: U256,
    pub data: String,
}

impl TransactionRequest {
    /// A call to `to` with the given calldata and zero value.
    pub fn new(to: Address, data: impl Into<String>) -> Self {
        Self {
            to: Some(to),
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn gas(mut self, gas: U256) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn gas_price(mut self, gas_price: U256) -> Self {
        self.gas_price = Some(gas_price);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub transaction_index: U64,
    pub block_hash: B256,
    pub block_number: U64,
    pub from: Address,
    pub to: Option<Address>,
    pub cumulative_gas_used: U256,
    pub gas_used: U256,
    pub contract_address: Option<Address>,
    pub logs: Vec<LogItem>,
    pub logs_bloom: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<U64>,
    /// `0x1` success, `0x0` reverted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<U64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_gas_price: Option<U256>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.is_some_and(|s| s == U64::from(1))
    }
}

/// A mined transaction as returned by `eth_getTransactionBy*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: B256,
    pub nonce: U64,
    pub block_hash: Option<B256>,
    pub block_number: Option<U64>,
    pub transaction_index: Option<U64>,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub gas: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    pub input: String,
}

/// Block header fields plus either transaction hashes or full transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub hash: Option<B256>,
    pub parent_hash: B256,
    pub number: Option<U64>,
    pub timestamp: U64,
    pub gas_limit: U256,
    pub gas_used: U256,
    pub miner: Address,
    #[serde(default)]
    pub transactions: Vec<BlockTransaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransaction {
    Hash(B256),
    Full(Box<Transaction>),
}

/// The `wallet_addEthereumChain` parameter (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEthereumChainParameter {
    /// `0x` hex chain id
    pub chain_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rpc_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_explorer_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub icon_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_currency: Option<NativeCurrency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}
