//! Ordered `(field name, type)` lists describing a method's
//! parameters, its return tuple, or an event's parameters.
//!
//! Field order is the wire order: it drives positional ABI encoding, the
//! order of decoded records, and the canonical signature that selectors and
//! topic0 hashes are computed from. Reordering fields changes all three.

use std::collections::HashSet;
use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

use crate::error::AbiError;
use crate::types::TypeTag;

/// An immutable, ordered list of named type tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spec {
    fields: Vec<(String, TypeTag)>,
}

impl Spec {
    /// A spec with no fields (e.g. the result of a state-changing method).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a spec from `(name, type)` string pairs.
    ///
    /// # Errors
    /// `InvalidSpec` if a type string is not a supported tag or a field name
    /// repeats.
    pub fn new(fields: &[(&str, &str)]) -> Result<Self, AbiError> {
        Self::parse("spec", fields)
    }

    /// Like [`Spec::new`], naming `context` (e.g. `"transfer params"`) in
    /// error messages.
    pub fn parse(context: &str, fields: &[(&str, &str)]) -> Result<Self, AbiError> {
        let mut out = Vec::with_capacity(fields.len());
        for (name, ty) in fields {
            let tag: TypeTag = ty
                .parse()
                .map_err(|e: AbiError| AbiError::invalid_spec(context, *name, e.to_string()))?;
            out.push((name.to_string(), tag));
        }
        Self::checked(context, out)
    }

    /// Build a spec from already-typed tags.
    pub fn from_tags<N: Into<String>>(
        fields: impl IntoIterator<Item = (N, TypeTag)>,
    ) -> Result<Self, AbiError> {
        let fields: Vec<_> = fields.into_iter().map(|(n, t)| (n.into(), t)).collect();
        for (name, tag) in &fields {
            tag.validate()
                .map_err(|e| AbiError::invalid_spec("spec", name.as_str(), e.to_string()))?;
        }
        Self::checked("spec", fields)
    }

    /// Parse a JSON object such as `{"owner": "address", "id": "uint256"}`,
    /// preserving key order.
    ///
    /// # Errors
    /// `InvalidSpec` if a value is not a string, not a supported tag, or a
    /// key repeats.
    pub fn from_json_str(json: &str) -> Result<Self, AbiError> {
        let JsonFields(raw) = serde_json::from_str(json)?;
        let mut out = Vec::with_capacity(raw.len());
        for (name, ty) in raw {
            let ty_str = ty.as_str().ok_or_else(|| {
                AbiError::invalid_spec("spec", name.as_str(), format!("expected a type string, got {ty}"))
            })?;
            let tag: TypeTag = ty_str
                .parse()
                .map_err(|e: AbiError| AbiError::invalid_spec("spec", name.as_str(), e.to_string()))?;
            out.push((name, tag));
        }
        Self::checked("spec", out)
    }

    fn checked(context: &str, fields: Vec<(String, TypeTag)>) -> Result<Self, AbiError> {
        let mut seen = HashSet::new();
        for (name, _) in &fields {
            if !seen.insert(name.as_str()) {
                return Err(AbiError::invalid_spec(context, name.as_str(), "duplicate field name"));
            }
        }
        Ok(Self { fields })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeTag)> {
        self.fields.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn tags(&self) -> Vec<TypeTag> {
        self.fields.iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&TypeTag> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Canonical signature `name(t1,t2,...)`: no spaces, tags in spec order.
    pub fn signature(&self, name: &str) -> String {
        let tags: Vec<String> = self.fields.iter().map(|(_, t)| t.to_string()).collect();
        format!("{name}({})", tags.join(","))
    }
}

/// A JSON object's entries in document order, repeated keys included.
struct JsonFields(Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for JsonFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = JsonFields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of field name to type string")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JsonFields, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, serde_json::Value>()? {
                    entries.push(entry);
                }
                Ok(JsonFields(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
