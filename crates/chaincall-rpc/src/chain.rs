//! Typed client over any [`Transport`].
//!
//! Every method is a thin wrapper over [`Chain::rpc`]: it serializes its
//! parameters into the JSON shape the node expects and deserializes the
//! result, reporting any other shape as [`ChainError::UnexpectedResult`].

use alloy_primitives::{B256, U256, U64};
use chaincall_abi::{Call, EventType, TypedDataPayload};
use chaincall_core::{Address, Record, SignatureHasher};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ChainError;
use crate::transport::Transport;
use crate::types::{
    AddEthereumChainParameter, Block, BlockTag, LogItem, LogQuery, Transaction,
    TransactionReceipt, TransactionRequest,
};

pub struct Chain<T: Transport> {
    transport: T,
}

impl<T: Transport> Chain<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a raw request and return the untyped result.
    pub async fn rpc(&self, method: &str, params: Vec<Value>) -> Result<Value, ChainError> {
        tracing::debug!(method, url = self.transport.url(), "rpc request");
        let result = self.transport.request(method, params).await;
        if let Err(e) = &result {
            tracing::debug!(method, error = %e, "rpc failed");
        }
        Ok(result?)
    }

    async fn rpc_as<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<R, ChainError> {
        let value = self.rpc(method, params).await?;
        serde_json::from_value(value).map_err(|e| ChainError::unexpected(method, e.to_string()))
    }

    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        let id: U64 = self.rpc_as("eth_chainId", vec![]).await?;
        Ok(id.to::<u64>())
    }

    pub async fn block_number(&self) -> Result<u64, ChainError> {
        let n: U64 = self.rpc_as("eth_blockNumber", vec![]).await?;
        Ok(n.to::<u64>())
    }

    /// Accounts the provider can sign for.
    pub async fn accounts(&self) -> Result<Vec<Address>, ChainError> {
        self.rpc_as("eth_accounts", vec![]).await
    }

    /// Balance in wei at the latest block.
    pub async fn balance(&self, account: &Address) -> Result<U256, ChainError> {
        self.rpc_as("eth_getBalance", vec![json!(account), json!(BlockTag::Latest)])
            .await
    }

    /// `eth_call` at the latest block, returning the raw result hex.
    pub async fn call_raw(&self, to: &Address, data: &str) -> Result<String, ChainError> {
        self.rpc_as(
            "eth_call",
            vec![json!({ "to": to, "data": data }), json!(BlockTag::Latest)],
        )
        .await
    }

    /// `eth_call` with a built [`Call`], decoding the result against its
    /// return spec.
    pub async fn call(&self, to: &Address, call: &Call) -> Result<Record, ChainError> {
        let raw = self.call_raw(to, &call.data).await?;
        Ok(call.decode(&raw)?)
    }

    /// Submit a transaction through the provider's signer; returns its hash.
    pub async fn transact(&self, tx: &TransactionRequest) -> Result<B256, ChainError> {
        self.rpc_as("eth_sendTransaction", vec![json!(tx)]).await
    }

    pub async fn logs(&self, query: &LogQuery) -> Result<Vec<LogItem>, ChainError> {
        self.rpc_as("eth_getLogs", vec![json!(query)]).await
    }

    /// Fetch logs and decode each with `event`. Logs whose topic0 is not the
    /// event's are skipped.
    pub async fn events<H: SignatureHasher>(
        &self,
        event: &EventType<H>,
        query: &LogQuery,
    ) -> Result<Vec<(LogItem, Record)>, ChainError> {
        let logs = self.logs(query).await?;
        let mut out = Vec::with_capacity(logs.len());
        for log in logs {
            if !event.matches(&log) {
                continue;
            }
            let decoded = event.decode(&log)?;
            out.push((log, decoded));
        }
        tracing::debug!(event = event.name(), count = out.len(), "decoded logs");
        Ok(out)
    }

    /// `None` while the transaction is pending or unknown.
    pub async fn transaction_receipt(
        &self,
        hash: &B256,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        self.rpc_as("eth_getTransactionReceipt", vec![json!(hash)]).await
    }

    pub async fn transaction_by_block_hash_and_index(
        &self,
        block_hash: &B256,
        index: u64,
    ) -> Result<Option<Transaction>, ChainError> {
        self.rpc_as(
            "eth_getTransactionByBlockHashAndIndex",
            vec![json!(block_hash), json!(U64::from(index))],
        )
        .await
    }

    pub async fn block_by_number(
        &self,
        block: BlockTag,
        full_transactions: bool,
    ) -> Result<Option<Block>, ChainError> {
        self.rpc_as("eth_getBlockByNumber", vec![json!(block), json!(full_transactions)])
            .await
    }

    pub async fn block_by_hash(
        &self,
        hash: &B256,
        full_transactions: bool,
    ) -> Result<Option<Block>, ChainError> {
        self.rpc_as("eth_getBlockByHash", vec![json!(hash), json!(full_transactions)])
            .await
    }

    /// Ask the provider's wallet to sign typed data; returns the 65-byte
    /// signature hex. The payload is sent as a JSON string that includes
    /// the standard `EIP712Domain` type.
    pub async fn sign_typed_data_v4(
        &self,
        account: &Address,
        payload: &TypedDataPayload,
    ) -> Result<String, ChainError> {
        let request = serde_json::to_string(&payload.to_json())
            .map_err(|e| ChainError::unexpected("eth_signTypedData_v4", e.to_string()))?;
        self.rpc_as("eth_signTypedData_v4", vec![json!(account), json!(request)])
            .await
    }

    /// Ask the wallet to add (and usually switch to) a network.
    pub async fn add_chain(&self, params: &AddEthereumChainParameter) -> Result<(), ChainError> {
        self.rpc("wallet_addEthereumChain", vec![json!(params)]).await?;
        Ok(())
    }
}
