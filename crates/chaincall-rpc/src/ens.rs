//! ENS helpers: batch reverse resolution, name normalisation and namehash.
//!
//! Reverse resolution goes through the ReverseRecords contract
//! (<https://github.com/ensdomains/reverse-records>), which resolves many
//! addresses in a single `eth_call`.

use alloy_primitives::B256;
use chaincall_abi::View;
use chaincall_core::{keccak256, record, Address, Spec, Value};

use crate::chain::Chain;
use crate::config::ClientConfig;
use crate::error::ChainError;
use crate::transport::Transport;

/// ReverseRecords deployment on Ethereum mainnet.
pub const REVERSE_RECORDS_MAINNET: &str = "0x3671ae578e63fdf66ad4f3e12cc0c0d71ac7510c";

/// A ReverseRecords contract at a known address.
#[derive(Debug, Clone)]
pub struct ReverseRecords {
    address: Address,
    get_names: View,
}

impl ReverseRecords {
    pub fn new(address: Address) -> Result<Self, ChainError> {
        let get_names = View::new(
            "getNames",
            Spec::parse("getNames params", &[("addresses", "address[]")])?,
            Spec::parse("getNames returns", &[("r", "string[]")])?,
        );
        Ok(Self { address, get_names })
    }

    pub fn mainnet() -> Result<Self, ChainError> {
        Self::new(Address::parse(REVERSE_RECORDS_MAINNET)?)
    }

    /// The configured override, or the mainnet deployment.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ChainError> {
        match &config.ens_reverse_records {
            Some(address) => Self::new(address.clone()),
            None => Self::mainnet(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Primary ENS names for `addresses`, in order.
    ///
    /// An address without a name, or whose name is not already in normalised
    /// form (a possible homograph), yields `""`.
    pub async fn reverse_lookup<T: Transport>(
        &self,
        chain: &Chain<T>,
        addresses: &[Address],
    ) -> Result<Vec<String>, ChainError> {
        let call = self
            .get_names
            .call(&record! { "addresses" => addresses.to_vec() })?;
        let result = chain.call(&self.address, &call).await?;

        let names = match result.get("r") {
            Some(Value::Array(items)) => items,
            other => {
                return Err(ChainError::unexpected(
                    "getNames",
                    format!("expected string[], got {other:?}"),
                ))
            }
        };
        if names.len() != addresses.len() {
            return Err(ChainError::unexpected(
                "getNames",
                format!("{} names for {} addresses", names.len(), addresses.len()),
            ));
        }

        names
            .iter()
            .map(|n| match n {
                Value::Str(name) if is_normalized(name) => Ok(name.clone()),
                Value::Str(name) => {
                    tracing::warn!(%name, "discarding non-normalised ENS name");
                    Ok(String::new())
                }
                other => Err(ChainError::unexpected("getNames", format!("non-string name {other}"))),
            })
            .collect()
    }
}

/// Reverse-resolve through the mainnet ReverseRecords deployment.
pub async fn reverse_lookup<T: Transport>(
    chain: &Chain<T>,
    addresses: &[Address],
) -> Result<Vec<String>, ChainError> {
    ReverseRecords::mainnet()?.reverse_lookup(chain, addresses).await
}

/// UTS-46 `ToASCII` with STD3 rules and non-transitional processing; DNS
/// length limits are not enforced.
pub fn normalize_name(name: &str) -> Result<String, ChainError> {
    idna::domain_to_ascii_cow(name.as_bytes(), idna::AsciiDenyList::STD3)
        .map(|n| n.into_owned())
        .map_err(|e| ChainError::Config(format!("invalid ENS name '{name}': {e:?}")))
}

/// `true` if `name` is unchanged by [`normalize_name`].
pub fn is_normalized(name: &str) -> bool {
    normalize_name(name).is_ok_and(|n| n == name)
}

/// EIP-137 namehash of a dotted name (`"vitalik.eth"`). The empty name
/// hashes to zero. Labels are UTS-46 mapped to their Unicode form first.
pub fn namehash(name: &str) -> Result<B256, ChainError> {
    if name.is_empty() {
        return Ok(B256::ZERO);
    }
    let (normalized, checked) = idna::domain_to_unicode(name);
    checked.map_err(|e| ChainError::Config(format!("invalid ENS name '{name}': {e:?}")))?;
    let labels: Vec<&str> = normalized.split('.').rev().collect();
    Ok(namehash_labels(&labels))
}

/// Fold already-normalised labels into a namehash, root-most label first
/// (`["eth", "vitalik"]`).
pub fn namehash_labels(labels: &[&str]) -> B256 {
    let mut node = [0u8; 32];
    for label in labels {
        let label_hash = keccak256(label.as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&node);
        buf[32..].copy_from_slice(&label_hash);
        node = keccak256(&buf);
    }
    B256::from(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaincall_core::encoding::to_hex;

    #[test]
    fn namehash_vectors() {
        assert_eq!(namehash("").unwrap(), B256::ZERO);
        assert_eq!(
            to_hex(namehash("eth").unwrap()),
            "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            to_hex(namehash("foo.eth").unwrap()),
            "0xde9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }

    #[test]
    fn namehash_normalises_case() {
        assert_eq!(namehash("Foo.ETH").unwrap(), namehash("foo.eth").unwrap());
    }

    #[test]
    fn labels_fold_from_the_root() {
        assert_eq!(namehash_labels(&["eth", "foo"]), namehash("foo.eth").unwrap());
    }

    #[test]
    fn normalisation_flags_homographs() {
        assert!(is_normalized("vitalik.eth"));
        assert!(!is_normalized("Vitalik.eth"));
        // Cyrillic "а" in place of Latin "a"
        assert!(!is_normalized("v\u{0456}talik.eth"));
        assert!(!is_normalized("bad_name!.eth"));
    }

    #[test]
    fn mainnet_address_is_lowercase() {
        let rr = ReverseRecords::mainnet().unwrap();
        assert_eq!(rr.address().as_str(), REVERSE_RECORDS_MAINNET);
    }
}
