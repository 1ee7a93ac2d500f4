//! Ready-made `wallet_addEthereumChain` parameters.

use crate::types::{AddEthereumChainParameter, NativeCurrency};

/// Optimism mainnet (chain id 10).
pub fn optimism() -> AddEthereumChainParameter {
    AddEthereumChainParameter {
        chain_id: "0xa".into(),
        chain_name: Some("Optimism".into()),
        rpc_urls: vec!["https://mainnet.optimism.io".into()],
        block_explorer_urls: vec!["https://optimistic.etherscan.io/".into()],
        icon_urls: vec![],
        native_currency: Some(NativeCurrency {
            name: "Optimistic ETH".into(),
            symbol: "ETH".into(),
            decimals: 18,
        }),
    }
}

/// Optimistic Kovan testnet (chain id 69).
pub fn optimistic_kovan() -> AddEthereumChainParameter {
    AddEthereumChainParameter {
        chain_id: "0x45".into(),
        chain_name: Some("Optimistic Kovan".into()),
        rpc_urls: vec!["https://kovan.optimism.io".into()],
        block_explorer_urls: vec!["https://kovan-optimistic.etherscan.io/".into()],
        icon_urls: vec![],
        native_currency: None,
    }
}
