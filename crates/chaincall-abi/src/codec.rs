//! ABI codec: parameter-tuple encoding and decoding for ChainCall values,
//! plus the per-value topic encoding used by event filters.
//!
//! Canonical head/tail encoding is delegated to `alloy-dyn-abi`; this module
//! only maps between ChainCall's [`Spec`] / [`Record`] shapes and alloy's
//! dynamic values.
//!
//! # Usage
//! ```ignore
//! let spec = Spec::new(&[("to", "address"), ("value", "uint256")])?;
//! let bytes = codec::encode_object(&spec, &record! { "to" => to, "value" => 1u64 })?;
//! let back = codec::decode_object(&spec, &bytes)?;
//! ```

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::B256;
use chaincall_core::{
    encoding::{from_hex, word_from_hex},
    keccak256, AbiError, Record, Spec, TypeTag, Value,
};

use crate::registry;

/// Encode `values` as a top-level parameter tuple of `types`.
pub fn encode(types: &[TypeTag], values: &[Value]) -> Result<Vec<u8>, AbiError> {
    if types.len() != values.len() {
        return Err(AbiError::LengthMismatch {
            types: types.len(),
            values: values.len(),
        });
    }
    let sol = types
        .iter()
        .zip(values)
        .map(|(tag, value)| registry::to_sol(tag, value))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DynSolValue::Tuple(sol).abi_encode_params())
}

/// Decode a top-level parameter tuple of `types` from `data`.
pub fn decode(types: &[TypeTag], data: &[u8]) -> Result<Vec<Value>, AbiError> {
    if types.is_empty() {
        return Ok(Vec::new());
    }
    for tag in types {
        tag.validate()?;
    }
    let tuple = DynSolType::Tuple(types.iter().map(registry::sol_type).collect());
    let decoded = tuple
        .abi_decode_params(data)
        .map_err(|e| AbiError::AbiDecodeFailed { reason: e.to_string() })?;

    let values = match decoded {
        DynSolValue::Tuple(values) => values,
        other => vec![other],
    };
    if values.len() != types.len() {
        return Err(AbiError::LengthMismatch {
            types: types.len(),
            values: values.len(),
        });
    }
    types
        .iter()
        .zip(values)
        .map(|(tag, value)| registry::from_sol(tag, value))
        .collect()
}

/// Encode a record in spec order. Every spec field must be present.
pub fn encode_object(spec: &Spec, values: &Record) -> Result<Vec<u8>, AbiError> {
    let mut sol = Vec::with_capacity(spec.len());
    for (name, tag) in spec.iter() {
        let value = values
            .get(name)
            .ok_or_else(|| AbiError::MissingField { field: name.to_string() })?;
        let encoded = registry::to_sol(tag, value).map_err(|e| match e {
            AbiError::TypeMismatch { expected, got } => AbiError::TypeMismatch {
                expected: format!("{expected} for field '{name}'"),
                got,
            },
            other => other,
        })?;
        sol.push(encoded);
    }
    let out = DynSolValue::Tuple(sol).abi_encode_params();
    tracing::trace!(fields = spec.len(), bytes = out.len(), "encoded record");
    Ok(out)
}

/// Decode bytes into a record keyed by spec field names, in spec order.
///
/// An empty spec yields an empty record without inspecting `data`.
pub fn decode_object(spec: &Spec, data: &[u8]) -> Result<Record, AbiError> {
    if spec.is_empty() {
        return Ok(Record::new());
    }
    let values = decode(&spec.tags(), data).map_err(|e| {
        tracing::debug!(bytes = data.len(), error = %e, "record decode failed");
        e
    })?;
    Ok(spec
        .names()
        .map(str::to_string)
        .zip(values)
        .collect())
}

/// [`decode_object`] over a `0x` hex string, as returned by `eth_call`.
pub fn decode_object_hex(spec: &Spec, data: &str) -> Result<Record, AbiError> {
    if spec.is_empty() {
        return Ok(Record::new());
    }
    decode_object(spec, &from_hex(data)?)
}

/// The 32-byte topic an indexed field with this value occupies.
///
/// Static types occupy their ABI word directly. Dynamic types are stored as
/// the keccak-256 of their in-place encoding: the raw UTF-8 bytes for a
/// `string`, and for arrays the concatenation of each element's encoding
/// (string elements padded to a 32-byte multiple, with no length prefix).
pub fn encode_topic(tag: &TypeTag, value: &Value) -> Result<B256, AbiError> {
    tag.validate()?;
    if !tag.is_dynamic() {
        return static_word(tag, value);
    }
    let mut preimage = Vec::new();
    topic_preimage(tag, value, &mut preimage, true)?;
    Ok(B256::from(keccak256(&preimage)))
}

fn static_word(tag: &TypeTag, value: &Value) -> Result<B256, AbiError> {
    registry::to_sol(tag, value)?
        .as_word()
        .ok_or_else(|| AbiError::AbiEncodeFailed {
            reason: format!("{tag} is not a single-word type"),
        })
}

fn topic_preimage(
    tag: &TypeTag,
    value: &Value,
    out: &mut Vec<u8>,
    top_level: bool,
) -> Result<(), AbiError> {
    match (tag, value) {
        (TypeTag::String, Value::Str(s)) => {
            out.extend_from_slice(s.as_bytes());
            if !top_level {
                let rem = s.len() % 32;
                if rem != 0 {
                    out.resize(out.len() + 32 - rem, 0);
                }
            }
            Ok(())
        }
        (TypeTag::Array(elem), Value::Array(items)) => {
            for item in items {
                topic_preimage(elem, item, out, false)?;
            }
            Ok(())
        }
        (tag, value) if !tag.is_dynamic() => {
            out.extend_from_slice(static_word(tag, value)?.as_slice());
            Ok(())
        }
        (tag, value) => Err(AbiError::mismatch(tag.to_string(), value.kind())),
    }
}

/// Decode an indexed field from its topic.
///
/// Dynamic types cannot be recovered from a topic and come back as
/// [`Value::Hash`].
pub fn decode_topic(tag: &TypeTag, topic: &B256) -> Result<Value, AbiError> {
    tag.validate()?;
    if tag.is_dynamic() {
        return Ok(Value::Hash(*topic));
    }
    let decoded = registry::sol_type(tag)
        .abi_decode(topic.as_slice())
        .map_err(|e| AbiError::AbiDecodeFailed {
            reason: format!("topic {topic} as {tag}: {e}"),
        })?;
    registry::from_sol(tag, decoded)
}

/// Parse a `0x` hex topic string as returned in a log.
pub fn parse_topic(topic: &str) -> Result<B256, AbiError> {
    word_from_hex(topic).map(B256::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{I256, U256};
    use chaincall_core::{encoding::to_hex, record, Address};

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    #[test]
    fn transfer_args_encode_to_two_words() {
        let spec = Spec::new(&[("to", "address"), ("value", "uint256")]).unwrap();
        let bytes = encode_object(
            &spec,
            &record! {
                "to" => addr("0x000000000000000000000000000000000000dead"),
                "value" => 1000u64,
            },
        )
        .unwrap();
        assert_eq!(
            hex::encode(&bytes),
            concat!(
                "000000000000000000000000000000000000000000000000000000000000dead",
                "00000000000000000000000000000000000000000000000000000000000003e8",
            )
        );
    }

    #[test]
    fn record_keys_out_of_order_still_encode_in_spec_order() {
        let spec = Spec::new(&[("a", "uint8"), ("b", "bool")]).unwrap();
        let forward = encode_object(&spec, &record! { "a" => 1u64, "b" => true }).unwrap();
        let reversed = encode_object(&spec, &record! { "b" => true, "a" => 1u64 }).unwrap();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let spec = Spec::new(&[("owner", "address"), ("spender", "address")]).unwrap();
        let err = encode_object(
            &spec,
            &record! { "owner" => addr("0x000000000000000000000000000000000000dead") },
        )
        .unwrap_err();
        assert!(matches!(err, AbiError::MissingField { ref field } if field == "spender"));
    }

    #[test]
    fn type_mismatch_names_the_field() {
        let spec = Spec::new(&[("flag", "bool")]).unwrap();
        let err = encode_object(&spec, &record! { "flag" => "yes" }).unwrap_err();
        assert!(err.to_string().contains("'flag'"));
    }

    #[test]
    fn length_mismatch() {
        let err = encode(&[TypeTag::Bool], &[]).unwrap_err();
        assert!(matches!(err, AbiError::LengthMismatch { types: 1, values: 0 }));
    }

    #[test]
    fn every_tag_round_trips_through_raw_json() {
        let cases: Vec<(&str, Value)> = vec![
            ("address", Value::Address(addr("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"))),
            ("string", Value::from("hello, world")),
            ("bool", Value::Bool(true)),
            ("bytes32", Value::Uint(U256::from(0xdead_beefu64) << 200usize)),
            ("uint8", Value::from(200u64)),
            ("uint256", Value::Uint(U256::MAX)),
            ("int24", Value::Int(I256::try_from(-8_388_608i64).unwrap())),
            ("int256", Value::Int(I256::MIN)),
            ("address[]", Value::from(vec![
                addr("0x0000000000000000000000000000000000000001"),
                addr("0xffffffffffffffffffffffffffffffffffffffff"),
            ])),
            ("string[]", Value::from(vec!["a", "", "a much longer string that spans more than one word"])),
            ("bool[]", Value::from(Vec::<bool>::new())),
            ("uint16[]", Value::from(vec![1u64, 65535u64])),
        ];
        for (tag_str, value) in cases {
            let tag: TypeTag = tag_str.parse().unwrap();
            let bytes = encode(std::slice::from_ref(&tag), std::slice::from_ref(&value)).unwrap();
            let decoded = decode(std::slice::from_ref(&tag), &bytes).unwrap();
            assert_eq!(decoded, vec![value.clone()], "{tag_str}");

            let raw = decoded[0].to_json();
            let reparsed = registry::decode(tag_str, &raw).unwrap();
            assert_eq!(reparsed, value, "{tag_str} via {raw}");
        }
    }

    #[test]
    fn empty_spec_decodes_without_reading() {
        assert!(decode_object_hex(&Spec::empty(), "0x").unwrap().is_empty());
        assert!(decode_object_hex(&Spec::empty(), "not hex").unwrap().is_empty());
    }

    #[test]
    fn decode_object_keeps_spec_order() {
        let spec = Spec::new(&[("z", "uint8"), ("a", "string")]).unwrap();
        let bytes = encode_object(&spec, &record! { "a" => "x", "z" => 3u64 }).unwrap();
        let rec = decode_object(&spec, &bytes).unwrap();
        let keys: Vec<_> = rec.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(rec["a"], Value::from("x"));
    }

    #[test]
    fn truncated_data_fails_to_decode() {
        let err = decode(&[TypeTag::Uint(256)], &[0u8; 16]).unwrap_err();
        assert!(matches!(err, AbiError::AbiDecodeFailed { .. }));
    }

    #[test]
    fn static_topics_are_the_abi_word() {
        let a = addr("0x000000000000000000000000000000000000dead");
        let topic = encode_topic(&TypeTag::Address, &Value::Address(a.clone())).unwrap();
        assert_eq!(
            to_hex(topic),
            "0x000000000000000000000000000000000000000000000000000000000000dead"
        );
        assert_eq!(decode_topic(&TypeTag::Address, &topic).unwrap(), Value::Address(a));

        let neg = Value::Int(I256::try_from(-1i64).unwrap());
        let topic = encode_topic(&TypeTag::Int(24), &neg).unwrap();
        assert_eq!(topic, B256::repeat_byte(0xff));
        assert_eq!(decode_topic(&TypeTag::Int(24), &topic).unwrap(), neg);
    }

    #[test]
    fn string_topic_is_keccak_of_raw_bytes() {
        let topic = encode_topic(&TypeTag::String, &Value::from("hello")).unwrap();
        assert_eq!(
            to_hex(topic),
            "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
        assert_eq!(decode_topic(&TypeTag::String, &topic).unwrap(), Value::Hash(topic));
    }

    #[test]
    fn array_topic_hashes_concatenated_words() {
        let value = Value::from(vec![1u64, 2u64]);
        let topic = encode_topic(&TypeTag::array(TypeTag::Uint(256)), &value).unwrap();
        let mut preimage = [0u8; 64];
        preimage[31] = 1;
        preimage[63] = 2;
        assert_eq!(topic, B256::from(keccak256(&preimage)));
    }

    #[test]
    fn string_array_topic_pads_each_element() {
        let value = Value::from(vec!["ab"]);
        let topic = encode_topic(&TypeTag::array(TypeTag::String), &value).unwrap();
        let mut preimage = [0u8; 32];
        preimage[..2].copy_from_slice(b"ab");
        assert_eq!(topic, B256::from(keccak256(&preimage)));
    }

    #[test]
    fn bool_topic_rejects_non_bool() {
        assert!(encode_topic(&TypeTag::Bool, &Value::from("1")).is_err());
    }

    #[test]
    fn hand_built_widths_are_unsupported() {
        for tag in [TypeTag::Int(0), TypeTag::Uint(300), TypeTag::Uint(7)] {
            let value = match tag {
                TypeTag::Int(_) => Value::Int(I256::ZERO),
                _ => Value::Uint(U256::ZERO),
            };
            assert!(matches!(
                encode(&[tag.clone()], &[value.clone()]),
                Err(AbiError::UnsupportedType { .. })
            ));
            assert!(matches!(encode_topic(&tag, &value), Err(AbiError::UnsupportedType { .. })));
            assert!(matches!(
                decode(&[tag.clone()], &[0u8; 32]),
                Err(AbiError::UnsupportedType { .. })
            ));
            assert!(matches!(
                decode_topic(&tag, &B256::ZERO),
                Err(AbiError::UnsupportedType { .. })
            ));
        }
        let nested = TypeTag::array(TypeTag::Int(0));
        assert!(matches!(
            encode(&[nested], &[Value::Array(vec![Value::Int(I256::ZERO)])]),
            Err(AbiError::UnsupportedType { .. })
        ));
    }
}
