//! EIP-712 typed structured data: signing hash and signer recovery.
//!
//! Payloads follow the `eth_signTypedData_v4` JSON layout:
//! - `types`: struct type definitions, including `EIP712Domain`
//! - `primaryType`: the root type being signed
//! - `domain`: domain separator values
//! - `message`: the data being signed
//!
//! Hashing (domain separator, `encodeType`, `hashStruct`) is done by
//! `alloy-dyn-abi`; recovery by `alloy-primitives` with the `k256` backend.
//!
//! # Reference
//! <https://eips.ethereum.org/EIPS/eip-712>

use std::collections::HashSet;

use alloy_dyn_abi::eip712::TypedData as AlloyTypedData;
use alloy_primitives::{Signature, B256};
use chaincall_core::{encoding::from_hex, AbiError, Address};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};

/// The reserved name of the domain struct.
pub const DOMAIN_TYPE: &str = "EIP712Domain";

/// A single field within an EIP-712 struct type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Eip712TypeField {
    pub name: String,
    /// Solidity type string (e.g. "address", "uint256", "Person", "Person[]")
    #[serde(rename = "type")]
    pub ty: String,
}

impl Eip712TypeField {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self { name: name.into(), ty: ty.into() }
    }
}

/// Struct name → ordered field list.
pub type Eip712Types = IndexMap<String, Vec<Eip712TypeField>>;

/// The domain every ChainCall signature is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl Eip712Domain {
    /// The fields of the `EIP712Domain` struct for this domain shape.
    pub fn type_fields() -> Vec<Eip712TypeField> {
        vec![
            Eip712TypeField::new("name", "string"),
            Eip712TypeField::new("version", "string"),
            Eip712TypeField::new("chainId", "uint256"),
            Eip712TypeField::new("verifyingContract", "address"),
        ]
    }

    /// JSON form used inside a typed-data payload. `chainId` is a hex quantity.
    pub fn to_json(&self) -> Json {
        json!({
            "name": self.name,
            "version": self.version,
            "chainId": format!("{:#x}", self.chain_id),
            "verifyingContract": self.verifying_contract.as_str(),
        })
    }
}

/// A complete typed-data payload, ready to hash or to hand to a wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedDataPayload {
    pub domain: Eip712Domain,
    /// Application types, without `EIP712Domain`
    pub types: Eip712Types,
    pub primary_type: String,
    pub message: Json,
}

impl TypedDataPayload {
    /// Build a payload, inferring the primary type from `types`.
    ///
    /// # Errors
    /// `InvalidTypedData` if the primary type cannot be inferred.
    pub fn new(domain: Eip712Domain, types: Eip712Types, message: Json) -> Result<Self, AbiError> {
        let primary_type = primary_type(&types)?;
        Ok(Self::with_primary_type(domain, types, primary_type, message))
    }

    pub fn with_primary_type(
        domain: Eip712Domain,
        mut types: Eip712Types,
        primary_type: impl Into<String>,
        message: Json,
    ) -> Self {
        types.shift_remove(DOMAIN_TYPE);
        Self {
            domain,
            types,
            primary_type: primary_type.into(),
            message,
        }
    }

    /// The `eth_signTypedData_v4` JSON object, with the standard
    /// `EIP712Domain` type added to `types`.
    pub fn to_json(&self) -> Json {
        let mut types = serde_json::Map::with_capacity(self.types.len() + 1);
        types.insert(DOMAIN_TYPE.to_string(), json!(Eip712Domain::type_fields()));
        for (name, fields) in &self.types {
            types.insert(name.clone(), json!(fields));
        }
        json!({
            "types": types,
            "primaryType": self.primary_type,
            "domain": self.domain.to_json(),
            "message": self.message,
        })
    }

    /// `keccak256("\x19\x01" ‖ domainSeparator ‖ hashStruct(message))`
    pub fn signing_hash(&self) -> Result<B256, AbiError> {
        let typed: AlloyTypedData = serde_json::from_value(self.to_json())
            .map_err(|e| AbiError::InvalidTypedData { reason: e.to_string() })?;
        typed
            .eip712_signing_hash()
            .map_err(|e| AbiError::InvalidTypedData { reason: e.to_string() })
    }
}

/// The primary type: the one struct no other struct refers to.
///
/// # Errors
/// `InvalidTypedData` if there is no such type or more than one.
pub fn primary_type(types: &Eip712Types) -> Result<String, AbiError> {
    let referenced: HashSet<&str> = types
        .values()
        .flatten()
        .map(|f| base_type(&f.ty))
        .collect();
    let candidates: Vec<&String> = types
        .keys()
        .filter(|k| k.as_str() != DOMAIN_TYPE && !referenced.contains(k.as_str()))
        .collect();
    match candidates.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(AbiError::InvalidTypedData {
            reason: "no primary type: every type is referenced by another".into(),
        }),
        many => Err(AbiError::InvalidTypedData {
            reason: format!(
                "ambiguous primary type: {}",
                many.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
            ),
        }),
    }
}

fn base_type(ty: &str) -> &str {
    ty.find('[').map_or(ty, |i| &ty[..i])
}

/// EIP-712 signing hash of `value` under `domain` and `types`.
pub fn hash_typed_data(
    domain: &Eip712Domain,
    types: &Eip712Types,
    value: &Json,
) -> Result<B256, AbiError> {
    TypedDataPayload::new(domain.clone(), types.clone(), value.clone())?.signing_hash()
}

/// Recover the signer of a 32-byte prehash from a 65-byte `r ‖ s ‖ v` hex
/// signature.
///
/// # Errors
/// `InvalidSignature` for malformed bytes or a failed recovery.
pub fn recover_signer(hash: &B256, signature: &str) -> Result<Address, AbiError> {
    let invalid = |reason: String| AbiError::InvalidSignature { reason };
    let bytes = from_hex(signature).map_err(|e| invalid(e.to_string()))?;
    let sig = Signature::try_from(bytes.as_slice()).map_err(|e| invalid(e.to_string()))?;
    let signer = sig
        .recover_address_from_prehash(hash)
        .map_err(|e| invalid(e.to_string()))?;
    Ok(Address::from(signer))
}

/// Recover the address that produced `signature` over `value`.
///
/// A signature made under a different domain or message recovers to an
/// unrelated address rather than failing; callers compare the result with
/// the expected signer.
pub fn verify_typed_data_v4(
    domain: &Eip712Domain,
    types: &Eip712Types,
    value: &Json,
    signature: &str,
) -> Result<Address, AbiError> {
    let hash = hash_typed_data(domain, types, value)?;
    let signer = recover_signer(&hash, signature)?;
    tracing::debug!(signing_hash = %hash, %signer, "recovered typed-data signer");
    Ok(signer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaincall_core::encoding::to_hex;

    const SIGNATURE: &str = concat!(
        "0x4355c47d63924e8a72e509b65029052eb6c299d53a04e167c5775fd466751c9d",
        "07299936d304c153f6443dfa05f40ff007d72911b6f72307f996231605b91562",
        "1c"
    );

    fn domain() -> Eip712Domain {
        Eip712Domain {
            name: "Ether Mail".into(),
            version: "1".into(),
            chain_id: 1,
            verifying_contract: Address::parse("0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC").unwrap(),
        }
    }

    fn mail_types() -> Eip712Types {
        let mut types = Eip712Types::new();
        types.insert(
            "Person".into(),
            vec![
                Eip712TypeField::new("name", "string"),
                Eip712TypeField::new("wallet", "address"),
            ],
        );
        types.insert(
            "Mail".into(),
            vec![
                Eip712TypeField::new("from", "Person"),
                Eip712TypeField::new("to", "Person"),
                Eip712TypeField::new("contents", "string"),
            ],
        );
        types
    }

    fn mail() -> Json {
        json!({
            "from": { "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" },
            "to": { "name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" },
            "contents": "Hello, Bob!"
        })
    }

    #[test]
    fn primary_type_is_the_unreferenced_struct() {
        assert_eq!(primary_type(&mail_types()).unwrap(), "Mail");
    }

    #[test]
    fn ambiguous_primary_type_is_rejected() {
        let mut types = mail_types();
        types.insert("Other".into(), vec![Eip712TypeField::new("x", "uint256")]);
        assert!(matches!(
            primary_type(&types),
            Err(AbiError::InvalidTypedData { .. })
        ));
    }

    #[test]
    fn array_references_count() {
        let mut types = Eip712Types::new();
        types.insert("Item".into(), vec![Eip712TypeField::new("id", "uint256")]);
        types.insert("Order".into(), vec![Eip712TypeField::new("items", "Item[]")]);
        assert_eq!(primary_type(&types).unwrap(), "Order");
    }

    #[test]
    fn ether_mail_signing_hash() {
        let hash = hash_typed_data(&domain(), &mail_types(), &mail()).unwrap();
        assert_eq!(
            to_hex(hash),
            "0xbe609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2"
        );
    }

    #[test]
    fn ether_mail_signer_is_recovered_lowercase() {
        let signer = verify_typed_data_v4(&domain(), &mail_types(), &mail(), SIGNATURE).unwrap();
        assert_eq!(signer.as_str(), "0xcd2a3d9f938e13cd947ec05abc7fe734df8dd826");
    }

    #[test]
    fn other_domain_recovers_unrelated_address() {
        let mut other = domain();
        other.chain_id = 10;
        let signer = verify_typed_data_v4(&other, &mail_types(), &mail(), SIGNATURE).unwrap();
        assert_ne!(signer.as_str(), "0xcd2a3d9f938e13cd947ec05abc7fe734df8dd826");
    }

    #[test]
    fn malformed_signature_is_invalid() {
        for bad in ["0x1234", "not hex", ""] {
            assert!(matches!(
                verify_typed_data_v4(&domain(), &mail_types(), &mail(), bad),
                Err(AbiError::InvalidSignature { .. })
            ));
        }
    }

    #[test]
    fn payload_json_includes_domain_type() {
        let payload = TypedDataPayload::new(domain(), mail_types(), mail()).unwrap();
        let json = payload.to_json();
        let keys: Vec<_> = json["types"].as_object().unwrap().keys().cloned().collect();
        assert!(keys.contains(&DOMAIN_TYPE.to_string()));
        assert_eq!(json["primaryType"], "Mail");
        assert_eq!(json["domain"]["chainId"], "0x1");
        assert_eq!(
            json["domain"]["verifyingContract"],
            "0xcccccccccccccccccccccccccccccccccccccccc"
        );
    }
}
