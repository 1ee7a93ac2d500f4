//! The closed set of supported Solidity type tags and the values they
//! decode to.
//!
//! ChainCall deliberately supports a small, enumerated subset of the ABI:
//! `address`, `string`, `bool`, `bytes32`, `uintN` / `intN` and the
//! one-dimensional dynamic array form of each. Anything else is rejected
//! when a spec is built.

use alloy_primitives::{B256, I256, U256};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::address::Address;
use crate::encoding::to_hex;
use crate::error::AbiError;

/// A supported Solidity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// 20-byte address
    Address,
    /// UTF-8 string
    String,
    Bool,
    /// 32-byte word, surfaced as an unsigned integer
    Bytes32,
    /// Unsigned integer, width in bits (8..=256, multiple of 8)
    Uint(u16),
    /// Signed integer, width in bits (8..=256, multiple of 8)
    Int(u16),
    /// Dynamic array of a scalar type
    Array(Box<TypeTag>),
}

impl TypeTag {
    pub fn array(elem: TypeTag) -> Self {
        TypeTag::Array(Box::new(elem))
    }

    /// `true` for types whose ABI encoding lives in the tail section
    /// (and whose indexed topic is a hash rather than the value itself).
    pub fn is_dynamic(&self) -> bool {
        matches!(self, TypeTag::String | TypeTag::Array(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeTag::Array(_))
    }

    /// The element type of an array tag.
    pub fn element(&self) -> Option<&TypeTag> {
        match self {
            TypeTag::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// Check that a programmatically built tag belongs to the supported set.
    pub fn validate(&self) -> Result<(), AbiError> {
        match self {
            TypeTag::Uint(bits) | TypeTag::Int(bits) if !valid_width(*bits) => {
                Err(AbiError::UnsupportedType { tag: self.to_string() })
            }
            TypeTag::Array(elem) if elem.is_array() => {
                Err(AbiError::UnsupportedType { tag: self.to_string() })
            }
            TypeTag::Array(elem) => elem.validate(),
            _ => Ok(()),
        }
    }
}

fn valid_width(bits: u16) -> bool {
    bits > 0 && bits <= 256 && bits % 8 == 0
}

fn parse_width(digits: &str) -> Option<u16> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let bits: u16 = digits.parse().ok()?;
    valid_width(bits).then_some(bits)
}

fn parse_scalar(s: &str) -> Option<TypeTag> {
    match s {
        "address" => Some(TypeTag::Address),
        "string" => Some(TypeTag::String),
        "bool" => Some(TypeTag::Bool),
        "bytes32" => Some(TypeTag::Bytes32),
        "uint" => Some(TypeTag::Uint(256)),
        "int" => Some(TypeTag::Int(256)),
        _ => {
            if let Some(digits) = s.strip_prefix("uint") {
                parse_width(digits).map(TypeTag::Uint)
            } else if let Some(digits) = s.strip_prefix("int") {
                parse_width(digits).map(TypeTag::Int)
            } else {
                None
            }
        }
    }
}

impl FromStr for TypeTag {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || AbiError::UnsupportedType { tag: s.to_string() };
        match s.strip_suffix("[]") {
            Some(inner) => parse_scalar(inner).map(TypeTag::array).ok_or_else(unsupported),
            None => parse_scalar(s).ok_or_else(unsupported),
        }
    }
}

/// Canonical spelling, as used inside selector and topic signatures.
impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Address => write!(f, "address"),
            TypeTag::String => write!(f, "string"),
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::Bytes32 => write!(f, "bytes32"),
            TypeTag::Uint(bits) => write!(f, "uint{bits}"),
            TypeTag::Int(bits) => write!(f, "int{bits}"),
            TypeTag::Array(elem) => write!(f, "{elem}[]"),
        }
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A decoded, typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// All unsigned widths and `bytes32`
    Uint(U256),
    Int(I256),
    Bool(bool),
    Str(String),
    /// Lowercase-normalized address
    Address(Address),
    Array(Vec<Value>),
    /// keccak-256 digest standing in for an indexed dynamic event field;
    /// the original value is not recoverable from the log.
    Hash(B256),
}

impl Value {
    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Address(_) => "address",
            Value::Array(_) => "array",
            Value::Hash(_) => "hash",
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Value::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Value::Address(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<B256> {
        match self {
            Value::Hash(h) => Some(*h),
            _ => None,
        }
    }

    /// The raw JSON representation an RPC node (or a JS caller) would use:
    /// unsigned integers as `0x` quantities, signed integers as decimal
    /// strings, everything else as the obvious JSON scalar.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Uint(u) => Json::String(format!("0x{u:x}")),
            Value::Int(i) => Json::String(i.to_string()),
            Value::Bool(b) => Json::Bool(*b),
            Value::Str(s) => Json::String(s.clone()),
            Value::Address(a) => Json::String(a.to_string()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Hash(h) => Json::String(to_hex(h)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uint(u) => write!(f, "{u}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Address(a) => write!(f, "{a}"),
            Value::Array(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Hash(h) => write!(f, "{}", to_hex(h)),
        }
    }
}

impl From<U256> for Value {
    fn from(u: U256) -> Self {
        Value::Uint(u)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(U256::from(u))
    }
}

impl From<u128> for Value {
    fn from(u: u128) -> Self {
        Value::Uint(U256::from(u))
    }
}

impl From<I256> for Value {
    fn from(i: I256) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<Address> for Value {
    fn from(a: Address) -> Self {
        Value::Address(a)
    }
}

impl From<B256> for Value {
    fn from(h: B256) -> Self {
        Value::Hash(h)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Named values in spec order. The argument and result shape of every
/// call and event.
pub type Record = IndexMap<String, Value>;

/// Build a [`Record`] from `name => value` pairs.
///
/// ```ignore
/// let args = record! { "owner" => owner, "spender" => spender };
/// ```
#[macro_export]
macro_rules! record {
    () => { $crate::Record::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut r = $crate::Record::new();
        $( r.insert(::std::string::String::from($name), $crate::Value::from($value)); )+
        r
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tag_display() {
        assert_eq!(TypeTag::Uint(256).to_string(), "uint256");
        assert_eq!(TypeTag::Address.to_string(), "address");
        assert_eq!(TypeTag::array(TypeTag::Address).to_string(), "address[]");
    }

    #[test]
    fn type_tag_parse_supported_set() {
        for s in [
            "address", "string", "bool", "bytes32", "uint8", "uint16", "uint64", "uint256",
            "int8", "int24", "int256", "address[]", "uint16[]", "uint256[]", "string[]",
        ] {
            let tag: TypeTag = s.parse().unwrap();
            assert_eq!(tag.to_string(), s);
        }
    }

    #[test]
    fn uint_alias_renders_canonically() {
        let tag: TypeTag = "uint".parse().unwrap();
        assert_eq!(tag, TypeTag::Uint(256));
        assert_eq!(tag.to_string(), "uint256");
    }

    #[test]
    fn type_tag_rejects_outside_the_set() {
        for s in ["bytes", "bytes4", "uint7", "uint264", "uint08", "uint+8", "tuple", "address[][]", "address[2]", ""] {
            assert!(
                matches!(s.parse::<TypeTag>(), Err(AbiError::UnsupportedType { .. })),
                "{s} should be rejected"
            );
        }
    }

    #[test]
    fn validate_catches_hand_built_tags() {
        assert!(TypeTag::Uint(7).validate().is_err());
        assert!(TypeTag::array(TypeTag::array(TypeTag::Bool)).validate().is_err());
        assert!(TypeTag::array(TypeTag::Int(128)).validate().is_ok());
    }

    #[test]
    fn value_json_form() {
        assert_eq!(Value::from(255u64).to_json(), serde_json::json!("0xff"));
        assert_eq!(Value::Int(I256::try_from(-5i64).unwrap()).to_json(), serde_json::json!("-5"));
        assert_eq!(
            Value::from(vec![true, false]).to_json(),
            serde_json::json!([true, false])
        );
    }

    #[test]
    fn record_macro_keeps_order() {
        let r = record! { "b" => 1u64, "a" => "x" };
        let keys: Vec<_> = r.keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
