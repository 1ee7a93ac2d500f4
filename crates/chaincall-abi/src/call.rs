//! Contract call builders.
//!
//! A [`View`] is declared once from a method name, its parameter spec and
//! its return spec, and then invoked many times. Each invocation produces a
//! [`Call`]: the `0x` calldata for `eth_call` / `eth_sendTransaction` plus a
//! decoder for the declared return tuple.
//!
//! The 4-byte selector is derived from the canonical signature on first use
//! and cached in the builder.
//!
//! ```ignore
//! let balance_of = View::new(
//!     "balanceOf",
//!     Spec::new(&[("owner", "address")])?,
//!     Spec::new(&[("balance", "uint256")])?,
//! );
//! let call = balance_of.call(&record! { "owner" => owner })?;
//! // call.data == "0x70a08231000000000000000000000000<owner>"
//! let result = call.decode(&raw_result_hex)?;
//! ```

use std::sync::{Arc, OnceLock};

use chaincall_core::{
    encoding::{from_hex, to_hex},
    hasher::method_selector_with,
    AbiError, Keccak, Record, Selector, SignatureHasher, Spec,
};

use crate::codec;

/// A declared contract method, read-only or state-changing.
#[derive(Debug, Clone)]
pub struct View<H: SignatureHasher = Keccak> {
    name: String,
    params: Spec,
    returns: Arc<Spec>,
    selector: OnceLock<Selector>,
    hasher: H,
}

/// A state-changing method: a [`View`] whose result spec is empty.
pub type Method<H = Keccak> = View<H>;

impl View<Keccak> {
    pub fn new(name: impl Into<String>, params: Spec, returns: Spec) -> Self {
        Self::with_hasher(name, params, returns, Keccak)
    }

    /// A method with no declared return values, for transactions.
    pub fn method(name: impl Into<String>, params: Spec) -> Self {
        Self::new(name, params, Spec::empty())
    }
}

impl<H: SignatureHasher> View<H> {
    /// Build with a custom hasher (used by tests to count hash evaluations).
    pub fn with_hasher(name: impl Into<String>, params: Spec, returns: Spec, hasher: H) -> Self {
        Self {
            name: name.into(),
            params,
            returns: Arc::new(returns),
            selector: OnceLock::new(),
            hasher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Spec {
        &self.params
    }

    pub fn returns(&self) -> &Spec {
        &self.returns
    }

    /// `name(t1,t2,...)`
    pub fn signature(&self) -> String {
        self.params.signature(&self.name)
    }

    /// The 4-byte selector, computed on first use.
    pub fn selector(&self) -> Selector {
        *self.selector.get_or_init(|| {
            let signature = self.signature();
            let selector = method_selector_with(&self.hasher, &signature);
            tracing::debug!(%signature, %selector, "computed method selector");
            selector
        })
    }

    /// Encode a call with the given named arguments.
    ///
    /// # Errors
    /// Any codec error from encoding `args` against the parameter spec,
    /// e.g. `MissingField` or `TypeMismatch`.
    pub fn call(&self, args: &Record) -> Result<Call, AbiError> {
        let selector = self.selector();
        let encoded = codec::encode_object(&self.params, args)?;
        let arg_hex = hex::encode(encoded);

        let mut data = String::with_capacity(10 + arg_hex.len() + 1);
        data.push_str(&selector.to_hex());
        if arg_hex.len() % 2 != 0 {
            data.push('0');
        }
        data.push_str(&arg_hex);

        tracing::trace!(method = %self.name, bytes = data.len() / 2 - 1, "encoded call");
        Ok(Call {
            data,
            returns: Arc::clone(&self.returns),
        })
    }

    /// Decode a raw `eth_call` result against the return spec.
    pub fn decode(&self, raw: &str) -> Result<Record, AbiError> {
        codec::decode_object_hex(&self.returns, raw)
    }

    /// Decode calldata produced for this method back into its arguments.
    ///
    /// # Errors
    /// `AbiDecodeFailed` if the calldata does not start with this method's
    /// selector.
    pub fn decode_input(&self, calldata: &str) -> Result<Record, AbiError> {
        let bytes = from_hex(calldata)?;
        let selector = self.selector();
        if bytes.len() < 4 || bytes[..4] != selector.0 {
            let found = to_hex(&bytes[..bytes.len().min(4)]);
            return Err(AbiError::AbiDecodeFailed {
                reason: format!("selector mismatch: expected {selector}, found {found}"),
            });
        }
        codec::decode_object(&self.params, &bytes[4..])
    }
}

/// An encoded call and the decoder for its result.
#[derive(Debug, Clone)]
pub struct Call {
    /// `0x` + selector + ABI-encoded arguments
    pub data: String,
    returns: Arc<Spec>,
}

impl Call {
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn returns(&self) -> &Spec {
        &self.returns
    }

    /// Decode the raw hex result of executing this call.
    pub fn decode(&self, raw: &str) -> Result<Record, AbiError> {
        codec::decode_object_hex(&self.returns, raw)
    }
}
