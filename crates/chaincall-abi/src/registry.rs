//! Per-tag conversions between ChainCall [`Value`]s, raw
//! RPC/JSON representations, and alloy's `DynSolValue`.
//!
//! Three directions are covered:
//! - [`decode`] / [`decode_tag`]: raw JSON (numeric strings, hex strings,
//!   booleans, arrays) → `Value`
//! - [`from_sol`]: decoded `DynSolValue` → `Value` (post-decode
//!   normalization for the codec)
//! - [`to_sol`]: `Value` → `DynSolValue` (pre-encode, for the codec)

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{B256, I256, U256};
use chaincall_core::{encoding::strip_0x, AbiError, Address, TypeTag, Value};
use serde_json::Value as Json;

/// The alloy type a tag encodes as.
pub fn sol_type(tag: &TypeTag) -> DynSolType {
    match tag {
        TypeTag::Address => DynSolType::Address,
        TypeTag::String => DynSolType::String,
        TypeTag::Bool => DynSolType::Bool,
        TypeTag::Bytes32 => DynSolType::FixedBytes(32),
        TypeTag::Uint(bits) => DynSolType::Uint(*bits as usize),
        TypeTag::Int(bits) => DynSolType::Int(*bits as usize),
        TypeTag::Array(elem) => DynSolType::Array(Box::new(sol_type(elem))),
    }
}

/// Decode a raw RPC value for the tag named by `tag`.
///
/// # Errors
/// `UnsupportedType` if `tag` is not in the supported set; otherwise see
/// [`decode_tag`].
pub fn decode(tag: &str, raw: &Json) -> Result<Value, AbiError> {
    let tag: TypeTag = tag.parse()?;
    decode_tag(&tag, raw)
}

/// Decode a raw RPC value for an already-parsed tag.
///
/// - integer tags and `bytes32`: decimal or `0x`-hex string, or a JSON integer
/// - `address`: hex string, normalized to lowercase
/// - `string`: passed through
/// - `bool`: only JSON `true` / `false` (`InvalidBoolean` otherwise)
/// - arrays: element-wise
pub fn decode_tag(tag: &TypeTag, raw: &Json) -> Result<Value, AbiError> {
    match tag {
        TypeTag::Uint(_) | TypeTag::Bytes32 => parse_uint(tag, raw).map(Value::Uint),
        TypeTag::Int(_) => parse_int(tag, raw).map(Value::Int),
        TypeTag::Address => {
            let s = raw
                .as_str()
                .ok_or_else(|| AbiError::mismatch("address string", raw.to_string()))?;
            Address::parse(s).map(Value::Address)
        }
        TypeTag::String => raw
            .as_str()
            .map(|s| Value::Str(s.to_string()))
            .ok_or_else(|| AbiError::mismatch("string", raw.to_string())),
        TypeTag::Bool => match raw {
            Json::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(AbiError::InvalidBoolean { got: other.to_string() }),
        },
        TypeTag::Array(elem) => {
            let items = raw
                .as_array()
                .ok_or_else(|| AbiError::mismatch(tag.to_string(), raw.to_string()))?;
            items
                .iter()
                .map(|item| decode_tag(elem, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
    }
}

fn parse_uint(tag: &TypeTag, raw: &Json) -> Result<U256, AbiError> {
    let bad = |reason: String| AbiError::mismatch(tag.to_string(), format!("{raw} ({reason})"));
    match raw {
        Json::String(s) => {
            let s = s.trim();
            let parsed = if s.starts_with("0x") || s.starts_with("0X") {
                U256::from_str_radix(strip_0x(s), 16)
            } else {
                U256::from_str_radix(s, 10)
            };
            parsed.map_err(|e| bad(e.to_string()))
        }
        Json::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| bad("not an unsigned 64-bit integer".into())),
        _ => Err(bad("expected a numeric string".into())),
    }
}

fn parse_int(tag: &TypeTag, raw: &Json) -> Result<I256, AbiError> {
    let bad = |reason: String| AbiError::mismatch(tag.to_string(), format!("{raw} ({reason})"));
    match raw {
        Json::String(s) => {
            let s = s.trim();
            let parsed = if s.contains("0x") || s.contains("0X") {
                I256::from_hex_str(s).map_err(|e| e.to_string())
            } else {
                I256::from_dec_str(s).map_err(|e| e.to_string())
            };
            parsed.map_err(bad)
        }
        Json::Number(n) => n
            .as_i64()
            .and_then(|i| I256::try_from(i).ok())
            .ok_or_else(|| bad("not a 64-bit integer".into())),
        _ => Err(bad("expected a numeric string".into())),
    }
}

/// Normalize a decoded alloy value into a ChainCall `Value` for `tag`.
pub fn from_sol(tag: &TypeTag, val: DynSolValue) -> Result<Value, AbiError> {
    match (tag, val) {
        (TypeTag::Uint(_), DynSolValue::Uint(u, _)) => Ok(Value::Uint(u)),
        (TypeTag::Int(_), DynSolValue::Int(i, _)) => Ok(Value::Int(i)),
        (TypeTag::Bytes32, DynSolValue::FixedBytes(word, 32)) => {
            Ok(Value::Uint(U256::from_be_bytes(word.0)))
        }
        (TypeTag::Address, DynSolValue::Address(a)) => Ok(Value::Address(Address::from(a))),
        (TypeTag::Bool, DynSolValue::Bool(b)) => Ok(Value::Bool(b)),
        (TypeTag::String, DynSolValue::String(s)) => Ok(Value::Str(s)),
        (TypeTag::Array(elem), DynSolValue::Array(items)) => items
            .into_iter()
            .map(|item| from_sol(elem, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (tag, other) => Err(AbiError::AbiDecodeFailed {
            reason: format!("expected {tag}, decoded {other:?}"),
        }),
    }
}

/// Convert a ChainCall `Value` into the alloy value for `tag`.
///
/// Integers are range-checked against the tag's width. Addresses may be
/// given as `Value::Address` or as a hex `Value::Str`; `bytes32` accepts an
/// integer or a `Value::Hash`.
///
/// # Errors
/// `UnsupportedType` for a hand-built tag outside the supported set
/// (e.g. `TypeTag::Int(0)`), `TypeMismatch` if the value does not fit.
pub fn to_sol(tag: &TypeTag, value: &Value) -> Result<DynSolValue, AbiError> {
    tag.validate()?;
    value_to_sol(tag, value)
}

fn value_to_sol(tag: &TypeTag, value: &Value) -> Result<DynSolValue, AbiError> {
    let mismatch = || AbiError::mismatch(tag.to_string(), value.kind());
    match (tag, value) {
        (TypeTag::Uint(bits), Value::Uint(u)) => {
            if (*bits as usize) < 256 && u.bit_len() > *bits as usize {
                return Err(AbiError::mismatch(tag.to_string(), format!("out-of-range value {u}")));
            }
            Ok(DynSolValue::Uint(*u, *bits as usize))
        }
        (TypeTag::Int(bits), Value::Int(i)) => {
            if *bits < 256 {
                let limit = I256::from_raw(U256::from(1u8) << (*bits as usize - 1));
                if *i >= limit || *i < -limit {
                    return Err(AbiError::mismatch(tag.to_string(), format!("out-of-range value {i}")));
                }
            }
            Ok(DynSolValue::Int(*i, *bits as usize))
        }
        (TypeTag::Bytes32, Value::Uint(u)) => {
            Ok(DynSolValue::FixedBytes(B256::from(u.to_be_bytes::<32>()), 32))
        }
        (TypeTag::Bytes32, Value::Hash(h)) => Ok(DynSolValue::FixedBytes(*h, 32)),
        (TypeTag::Address, Value::Address(a)) => Ok(DynSolValue::Address(a.into())),
        (TypeTag::Address, Value::Str(s)) => {
            let a = Address::parse(s)?;
            Ok(DynSolValue::Address((&a).into()))
        }
        (TypeTag::Bool, Value::Bool(b)) => Ok(DynSolValue::Bool(*b)),
        (TypeTag::String, Value::Str(s)) => Ok(DynSolValue::String(s.clone())),
        (TypeTag::Array(elem), Value::Array(items)) => items
            .iter()
            .map(|item| value_to_sol(elem, item))
            .collect::<Result<Vec<_>, _>>()
            .map(DynSolValue::Array),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_family_accepts_hex_and_decimal() {
        assert_eq!(decode("uint256", &json!("0xff")).unwrap(), Value::from(255u64));
        assert_eq!(decode("uint8", &json!("255")).unwrap(), Value::from(255u64));
        assert_eq!(decode("uint64", &json!(7)).unwrap(), Value::from(7u64));
        assert_eq!(
            decode("int256", &json!("-42")).unwrap(),
            Value::Int(I256::try_from(-42i64).unwrap())
        );
    }

    #[test]
    fn bytes32_decodes_to_integer_without_truncation() {
        let raw = format!("0x{}", "ff".repeat(32));
        assert_eq!(decode("bytes32", &json!(raw)).unwrap(), Value::Uint(U256::MAX));
    }

    #[test]
    fn address_is_lowercased() {
        let v = decode("address", &json!("0xD8DA6BF26964AF9D7EED9E03E53415D37AA96045")).unwrap();
        assert_eq!(
            v.as_address().unwrap().as_str(),
            "0xd8da6bf26964af9d7eed9e03e53415d37aa96045"
        );
    }

    #[test]
    fn arrays_decode_element_wise() {
        let v = decode("address[]", &json!(["0xAB5801A7D398351B8BE11C439E05C5B3259AEC9B"])).unwrap();
        assert_eq!(
            v,
            Value::Array(vec![Value::Address(
                Address::parse("0xab5801a7d398351b8be11c439e05c5b3259aec9b").unwrap()
            )])
        );
        let v = decode("string[]", &json!(["a", "b"])).unwrap();
        assert_eq!(v, Value::from(vec!["a", "b"]));
        let v = decode("uint16[]", &json!(["0x1", "2"])).unwrap();
        assert_eq!(v, Value::from(vec![1u64, 2u64]));
    }

    #[test]
    fn bool_only_accepts_literals() {
        assert_eq!(decode("bool", &json!(true)).unwrap(), Value::Bool(true));
        assert_eq!(decode("bool", &json!(false)).unwrap(), Value::Bool(false));
        for bad in [json!("true"), json!(1), json!(null)] {
            assert!(matches!(
                decode("bool", &bad),
                Err(AbiError::InvalidBoolean { .. })
            ));
        }
    }

    #[test]
    fn unknown_tag_is_unsupported() {
        assert!(matches!(
            decode("bytes", &json!("0x")),
            Err(AbiError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn to_sol_range_checks_narrow_integers() {
        assert!(to_sol(&TypeTag::Uint(8), &Value::from(255u64)).is_ok());
        assert!(to_sol(&TypeTag::Uint(8), &Value::from(256u64)).is_err());
        let min = Value::Int(I256::try_from(-128i64).unwrap());
        let below = Value::Int(I256::try_from(-129i64).unwrap());
        assert!(to_sol(&TypeTag::Int(8), &min).is_ok());
        assert!(to_sol(&TypeTag::Int(8), &below).is_err());
    }

    #[test]
    fn to_sol_rejects_wrong_variant() {
        let err = to_sol(&TypeTag::Bool, &Value::from(1u64)).unwrap_err();
        assert!(matches!(err, AbiError::TypeMismatch { .. }));
    }

    #[test]
    fn from_sol_normalizes_address() {
        let addr: alloy_primitives::Address = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"
            .parse()
            .unwrap();
        let v = from_sol(&TypeTag::Address, DynSolValue::Address(addr)).unwrap();
        assert_eq!(v.to_string(), "0xd8da6bf26964af9d7eed9e03e53415d37aa96045");
    }
}
