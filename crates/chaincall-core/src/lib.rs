//! # chaincall-core
//!
//! Core types shared across all ChainCall crates: the closed set of
//! supported Solidity type tags, ordered specs, decoded values, normalized
//! addresses, selector/topic hashing and the ABI error type.

pub mod address;
pub mod encoding;
pub mod error;
pub mod hasher;
pub mod spec;
pub mod types;

pub use address::{normalize_address, Address};
pub use error::AbiError;
pub use hasher::{event_topic0, keccak256, method_selector, Keccak, Selector, SignatureHasher};
pub use spec::Spec;
pub use types::{Record, TypeTag, Value};

pub use alloy_primitives::{B256, I256, U256};
