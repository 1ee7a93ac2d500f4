//! Ready-made declarations for common token standards.

use chaincall_core::{AbiError, Spec};

use crate::call::{Method, View};
use crate::event::EventType;

/// ERC-20 fungible token.
#[derive(Debug, Clone)]
pub struct Erc20 {
    /// `name() -> (string name)`
    pub name: View,
    /// `symbol() -> (string symbol)`
    pub symbol: View,
    /// `decimals() -> (uint8 decimals)`
    pub decimals: View,
    /// `balanceOf(address owner) -> (uint256 balance)`
    pub balance_of: View,
    /// `allowance(address owner, address spender) -> (uint256 remaining)`
    pub allowance: View,
    /// `approve(address spender, uint256 value)`
    pub approve: Method,
    /// `transfer(address to, uint256 value)`
    pub transfer: Method,
    /// `Transfer(address indexed from, address indexed to, uint256 value)`
    pub transfer_event: EventType,
}

impl Erc20 {
    pub fn new() -> Result<Self, AbiError> {
        Ok(Self {
            name: View::new("name", Spec::empty(), Spec::parse("name returns", &[("name", "string")])?),
            symbol: View::new(
                "symbol",
                Spec::empty(),
                Spec::parse("symbol returns", &[("symbol", "string")])?,
            ),
            decimals: View::new(
                "decimals",
                Spec::empty(),
                Spec::parse("decimals returns", &[("decimals", "uint8")])?,
            ),
            balance_of: View::new(
                "balanceOf",
                Spec::parse("balanceOf params", &[("owner", "address")])?,
                Spec::parse("balanceOf returns", &[("balance", "uint256")])?,
            ),
            allowance: View::new(
                "allowance",
                Spec::parse("allowance params", &[("owner", "address"), ("spender", "address")])?,
                Spec::parse("allowance returns", &[("remaining", "uint256")])?,
            ),
            approve: Method::method(
                "approve",
                Spec::parse("approve params", &[("spender", "address"), ("value", "uint256")])?,
            ),
            transfer: Method::method(
                "transfer",
                Spec::parse("transfer params", &[("to", "address"), ("value", "uint256")])?,
            ),
            transfer_event: EventType::new(
                "Transfer",
                Spec::parse(
                    "Transfer params",
                    &[("from", "address"), ("to", "address"), ("value", "uint256")],
                )?,
                &["from", "to"],
            )?,
        })
    }
}

/// ERC-1155 multi-token.
#[derive(Debug, Clone)]
pub struct Erc1155 {
    /// `balanceOfBatch(address[] owners, uint256[] ids) -> (uint256[] balances)`
    pub balance_of_batch: View,
    /// `TransferSingle(address indexed operator, address indexed from,
    /// address indexed to, uint256 id, uint256 value)`
    pub transfer_single: EventType,
}

impl Erc1155 {
    pub fn new() -> Result<Self, AbiError> {
        Ok(Self {
            balance_of_batch: View::new(
                "balanceOfBatch",
                Spec::parse(
                    "balanceOfBatch params",
                    &[("owners", "address[]"), ("ids", "uint256[]")],
                )?,
                Spec::parse("balanceOfBatch returns", &[("balances", "uint256[]")])?,
            ),
            transfer_single: EventType::new(
                "TransferSingle",
                Spec::parse(
                    "TransferSingle params",
                    &[
                        ("operator", "address"),
                        ("from", "address"),
                        ("to", "address"),
                        ("id", "uint256"),
                        ("value", "uint256"),
                    ],
                )?,
                &["operator", "from", "to"],
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaincall_core::encoding::to_hex;

    #[test]
    fn erc20_selectors() {
        let erc20 = Erc20::new().unwrap();
        assert_eq!(erc20.name.selector().to_hex(), "0x06fdde03");
        assert_eq!(erc20.symbol.selector().to_hex(), "0x95d89b41");
        assert_eq!(erc20.decimals.selector().to_hex(), "0x313ce567");
        assert_eq!(erc20.balance_of.selector().to_hex(), "0x70a08231");
        assert_eq!(erc20.allowance.selector().to_hex(), "0xdd62ed3e");
        assert_eq!(erc20.approve.selector().to_hex(), "0x095ea7b3");
        assert_eq!(erc20.transfer.selector().to_hex(), "0xa9059cbb");
    }

    #[test]
    fn erc1155_declarations() {
        let erc1155 = Erc1155::new().unwrap();
        assert_eq!(
            erc1155.balance_of_batch.signature(),
            "balanceOfBatch(address[],uint256[])"
        );
        assert_eq!(erc1155.balance_of_batch.selector().to_hex(), "0x4e1273f4");
        assert_eq!(
            to_hex(erc1155.transfer_single.topic0()),
            "0xc3d58168c5ae7397731d063d5bbf3d657854427343f4c083240f7aacaa2d0f62"
        );
        assert_eq!(erc1155.transfer_single.indexed().len(), 3);
    }
}
