//! Lowercase-normalized EVM addresses.
//!
//! Every address that enters or leaves ChainCall goes through
//! [`Address::parse`], so two addresses that differ only in letter case are
//! the same value and plain equality is safe.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::encoding::strip_0x;
use crate::error::AbiError;

/// A 20-byte EVM address stored as `0x` + 40 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// The zero address.
    pub fn zero() -> Self {
        Self(format!("0x{}", "0".repeat(40)))
    }

    /// Parse and normalize an address. Accepts any letter case and an
    /// optional `0x` prefix.
    pub fn parse(s: &str) -> Result<Self, AbiError> {
        let digits = strip_0x(s.trim());
        if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AbiError::mismatch(
                "address (20 bytes hex)",
                format!("'{s}'"),
            ));
        }
        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw 20 address bytes.
    pub fn to_bytes(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        // Invariant: the inner string is always 40 valid hex digits.
        if let Ok(bytes) = hex::decode(&self.0[2..]) {
            out.copy_from_slice(&bytes);
        }
        out
    }
}

/// Normalize an address string to the lowercase form.
pub fn normalize_address(s: &str) -> Result<String, AbiError> {
    Address::parse(s).map(|a| a.0)
}

impl From<alloy_primitives::Address> for Address {
    fn from(a: alloy_primitives::Address) -> Self {
        Self(format!("0x{}", hex::encode(a.as_slice())))
    }
}

impl From<&Address> for alloy_primitives::Address {
    fn from(a: &Address) -> Self {
        alloy_primitives::Address::from(a.to_bytes())
    }
}

impl FromStr for Address {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

    #[test]
    fn parse_lowercases() {
        let a = Address::parse(VITALIK).unwrap();
        assert_eq!(a.as_str(), "0xd8da6bf26964af9d7eed9e03e53415d37aa96045");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_address(VITALIK).unwrap();
        let twice = normalize_address(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn case_only_differences_compare_equal() {
        let upper = Address::parse(&VITALIK.to_uppercase().replacen("0X", "0x", 1)).unwrap();
        let lower = Address::parse(&VITALIK.to_lowercase()).unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse(&format!("0x{}", "g".repeat(40))).is_err());
    }

    #[test]
    fn alloy_conversion_roundtrip() {
        let a = Address::parse(VITALIK).unwrap();
        let alloy: alloy_primitives::Address = (&a).into();
        assert_eq!(Address::from(alloy), a);
    }

    #[test]
    fn serde_normalizes_on_the_way_in() {
        let a: Address = serde_json::from_str(&format!("\"{VITALIK}\"")).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            "\"0xd8da6bf26964af9d7eed9e03e53415d37aa96045\""
        );
    }
}
