//! # chaincall-abi
//!
//! Contract call and event filter builders on top of `alloy-core`.
//!
//! ## Implementation notes
//! - Canonical ABI encode/decode goes through `alloy-dyn-abi`
//! - Selectors and topic0 hashes are computed lazily and cached per builder
//! - Topics[1..] carry indexed parameters; dynamic ones are keccak digests
//! - EIP-712 hashing uses alloy's `eip712` support; recovery uses `k256`

pub mod call;
pub mod codec;
pub mod contracts;
pub mod eip712;
pub mod event;
pub mod registry;

pub use call::{Call, Method, View};
pub use contracts::{Erc1155, Erc20};
pub use eip712::{
    hash_typed_data, recover_signer, verify_typed_data_v4, Eip712Domain, Eip712TypeField,
    Eip712Types, TypedDataPayload,
};
pub use event::{EventQuery, EventType, LogRecord, RawLog, TopicFilter, TopicMatch, TopicSlot};
