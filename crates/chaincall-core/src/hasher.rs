//! Method selectors and event topic0 hashes.
//!
//! Both are keccak-256 of the canonical signature string, e.g.:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
//!
//! A selector is the first 4 bytes of that digest; topic0 is all 32.

use alloy_primitives::B256;
use std::fmt;
use tiny_keccak::{Hasher, Keccak as TinyKeccak};

use crate::encoding::to_hex;

/// The hash primitive used to derive selectors and topics.
///
/// Builders are generic over this so tests can observe how often a hash is
/// actually computed.
pub trait SignatureHasher: Send + Sync {
    fn keccak256(&self, input: &[u8]) -> [u8; 32];
}

/// keccak-256 backed by `tiny-keccak`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Keccak;

impl SignatureHasher for Keccak {
    fn keccak256(&self, input: &[u8]) -> [u8; 32] {
        keccak256(input)
    }
}

/// Plain keccak-256.
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = TinyKeccak::v256();
    let mut output = [0u8; 32];
    hasher.update(input);
    hasher.finalize(&mut output);
    output
}

/// A 4-byte function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// `0x` + 8 lowercase hex digits.
    pub fn to_hex(&self) -> String {
        to_hex(self.0)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Selector of a canonical method signature using the given hasher.
pub fn method_selector_with<H: SignatureHasher + ?Sized>(hasher: &H, signature: &str) -> Selector {
    let digest = hasher.keccak256(signature.as_bytes());
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&digest[..4]);
    Selector(sel)
}

/// topic0 of a canonical event signature using the given hasher.
pub fn event_topic0_with<H: SignatureHasher + ?Sized>(hasher: &H, signature: &str) -> B256 {
    B256::from(hasher.keccak256(signature.as_bytes()))
}

/// Selector of `name(type1,type2,...)`.
pub fn method_selector(signature: &str) -> Selector {
    method_selector_with(&Keccak, signature)
}

/// topic0 of `Name(type1,type2,...)`.
pub fn event_topic0(signature: &str) -> B256 {
    event_topic0_with(&Keccak, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erc20_transfer_selector() {
        assert_eq!(method_selector("transfer(address,uint256)").to_hex(), "0xa9059cbb");
    }

    #[test]
    fn selector_is_deterministic() {
        let a = method_selector("balanceOf(address)");
        let b = method_selector("balanceOf(address)");
        assert_eq!(a, b);
        assert_eq!(a.to_hex(), "0x70a08231");
    }

    #[test]
    fn erc20_transfer_topic0() {
        let topic = event_topic0("Transfer(address,address,uint256)");
        assert_eq!(
            to_hex(topic),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn uniswap_v3_swap_topic0() {
        let topic = event_topic0("Swap(address,address,int256,int256,uint160,uint128,int24)");
        assert_eq!(
            to_hex(topic),
            "0xc42079f94a6350d7e6235f29174924f928cc2ac818eb64fed8004e115fbcca67"
        );
    }

    #[test]
    fn selector_is_prefix_of_topic() {
        let sig = "approve(address,uint256)";
        assert_eq!(method_selector(sig).0, event_topic0(sig)[..4]);
    }
}
