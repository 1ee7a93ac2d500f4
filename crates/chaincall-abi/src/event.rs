//! Event filter builders and log decoding.
//!
//! An [`EventType`] is declared from an event name, its full parameter spec
//! and the names of its indexed parameters. It then builds `eth_getLogs`
//! topic filters and decodes matching logs back into records.
//!
//! # Topic layout
//! - `topics[0]`: keccak256 of the canonical signature
//! - `topics[1..]`: indexed parameters, in declaration order
//! - `data`: ABI-encoded tuple of the non-indexed parameters
//!
//! Indexed dynamic parameters (`string`, arrays) are stored on chain as the
//! keccak256 of their encoding and decode to [`Value::Hash`].

use std::collections::HashMap;
use std::sync::OnceLock;

use alloy_primitives::B256;
use chaincall_core::{
    hasher::event_topic0_with, AbiError, Keccak, Record, SignatureHasher, Spec, TypeTag, Value,
};
use serde::{Deserialize, Serialize};

use crate::codec;

/// EVM caps an event at three indexed parameters (four topics with topic0).
pub const MAX_INDEXED: usize = 3;

/// The parts of a log needed for decoding.
pub trait LogRecord {
    fn topics(&self) -> &[String];
    fn data(&self) -> &str;
}

/// A bare `{ topics, data }` log item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
    pub topics: Vec<String>,
    pub data: String,
}

impl LogRecord for RawLog {
    fn topics(&self) -> &[String] {
        &self.topics
    }

    fn data(&self) -> &str {
        &self.data
    }
}

/// Constraint on a single indexed parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicMatch {
    Exact(Value),
    /// Matches any of the listed values
    AnyOf(Vec<Value>),
    /// Explicitly unconstrained
    Any,
}

/// Named constraints on indexed parameters.
///
/// ```ignore
/// let q = EventQuery::new().eq("from", owner).any_of("to", vec![a, b]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    constraints: Vec<(String, TopicMatch)>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `field` against `value`. A list given for a non-array
    /// parameter matches any of its items, like [`EventQuery::any_of`].
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, TopicMatch::Exact(value.into()))
    }

    pub fn any_of<V: Into<Value>>(self, field: impl Into<String>, values: Vec<V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.with(field, TopicMatch::AnyOf(values))
    }

    pub fn wildcard(self, field: impl Into<String>) -> Self {
        self.with(field, TopicMatch::Any)
    }

    /// Set the constraint for `field`, replacing any earlier one.
    pub fn with(mut self, field: impl Into<String>, constraint: TopicMatch) -> Self {
        let field = field.into();
        match self.constraints.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = constraint,
            None => self.constraints.push((field, constraint)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TopicMatch)> {
        self.constraints.iter().map(|(f, c)| (f.as_str(), c))
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// One position of a topic filter: a single topic or an OR-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicSlot {
    One(B256),
    AnyOf(Vec<B256>),
}

/// The `topics` array of an `eth_getLogs` filter.
///
/// Always `1 + indexed` long; unconstrained positions are `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicFilter(pub Vec<Option<TopicSlot>>);

impl TopicFilter {
    pub fn slots(&self) -> &[Option<TopicSlot>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn topic0(&self) -> Option<B256> {
        match self.0.first() {
            Some(Some(TopicSlot::One(t))) => Some(*t),
            _ => None,
        }
    }
}

/// A declared event.
#[derive(Debug, Clone)]
pub struct EventType<H: SignatureHasher = Keccak> {
    name: String,
    params: Spec,
    /// Indexed parameter names in spec order
    indexed: Vec<String>,
    topic0: OnceLock<B256>,
    hasher: H,
}

impl EventType<Keccak> {
    /// Declare an event.
    ///
    /// # Errors
    /// `InvalidSpec` if an indexed name is not a parameter, or if more than
    /// three parameters are indexed.
    pub fn new(name: impl Into<String>, params: Spec, indexed: &[&str]) -> Result<Self, AbiError> {
        Self::with_hasher(name, params, indexed, Keccak)
    }
}

impl<H: SignatureHasher> EventType<H> {
    pub fn with_hasher(
        name: impl Into<String>,
        params: Spec,
        indexed: &[&str],
        hasher: H,
    ) -> Result<Self, AbiError> {
        let name = name.into();
        let context = format!("event {name}");
        for field in indexed {
            if !params.contains(field) {
                return Err(AbiError::invalid_spec(
                    context.as_str(),
                    *field,
                    "indexed field is not an event parameter",
                ));
            }
        }
        // topics are emitted in declaration order, whatever order was given
        let ordered: Vec<String> = params
            .names()
            .filter(|n| indexed.contains(n))
            .map(str::to_string)
            .collect();
        if ordered.len() > MAX_INDEXED {
            return Err(AbiError::invalid_spec(
                context.as_str(),
                ordered[MAX_INDEXED].as_str(),
                format!("at most {MAX_INDEXED} parameters can be indexed"),
            ));
        }
        Ok(Self {
            name,
            params,
            indexed: ordered,
            topic0: OnceLock::new(),
            hasher,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Spec {
        &self.params
    }

    pub fn indexed(&self) -> &[String] {
        &self.indexed
    }

    pub fn is_indexed(&self, field: &str) -> bool {
        self.indexed.iter().any(|n| n == field)
    }

    pub fn signature(&self) -> String {
        self.params.signature(&self.name)
    }

    /// keccak256 of the signature, computed on first use.
    pub fn topic0(&self) -> B256 {
        *self.topic0.get_or_init(|| {
            let signature = self.signature();
            let topic = event_topic0_with(&self.hasher, &signature);
            tracing::debug!(%signature, topic0 = %topic, "computed event topic0");
            topic
        })
    }

    /// Build the topic filter for a query over indexed parameters.
    ///
    /// # Errors
    /// `NotIndexed` if the query names a parameter that is not indexed (or
    /// does not exist); codec errors if a value does not fit its type.
    pub fn filter(&self, query: &EventQuery) -> Result<TopicFilter, AbiError> {
        let mut slots: Vec<Option<TopicSlot>> = vec![None; 1 + self.indexed.len()];
        slots[0] = Some(TopicSlot::One(self.topic0()));

        for (field, constraint) in query.iter() {
            let not_indexed = || AbiError::NotIndexed { field: field.to_string() };
            let pos = self
                .indexed
                .iter()
                .position(|n| n == field)
                .ok_or_else(not_indexed)?;
            let tag = self.params.get(field).ok_or_else(not_indexed)?;
            let any_of = |values: &[Value]| -> Result<Option<TopicSlot>, AbiError> {
                Ok(Some(TopicSlot::AnyOf(
                    values
                        .iter()
                        .map(|v| codec::encode_topic(tag, v))
                        .collect::<Result<_, _>>()?,
                )))
            };
            slots[pos + 1] = match constraint {
                // a list against a scalar parameter is an OR over its items
                TopicMatch::Exact(Value::Array(values)) if !tag.is_array() => any_of(values)?,
                TopicMatch::Exact(value) => Some(TopicSlot::One(codec::encode_topic(tag, value)?)),
                TopicMatch::AnyOf(values) => any_of(values)?,
                TopicMatch::Any => None,
            };
        }
        Ok(TopicFilter(slots))
    }

    /// The unconstrained filter: topic0 followed by nulls.
    pub fn filter_all(&self) -> TopicFilter {
        let mut slots = vec![None; 1 + self.indexed.len()];
        slots[0] = Some(TopicSlot::One(self.topic0()));
        TopicFilter(slots)
    }

    /// `true` if the log's first topic is this event's topic0.
    pub fn matches<L: LogRecord + ?Sized>(&self, log: &L) -> bool {
        log.topics()
            .first()
            .and_then(|t| codec::parse_topic(t).ok())
            .is_some_and(|t| t == self.topic0())
    }

    /// Decode a log into a record keyed by parameter name, in spec order.
    ///
    /// Indexed parameters are read from `topics[1..]`; the rest are decoded
    /// from `data`. A log whose data is exactly `"0x"` yields only the
    /// indexed parameters.
    pub fn decode<L: LogRecord + ?Sized>(&self, log: &L) -> Result<Record, AbiError> {
        let topics = log.topics();
        let mut values: HashMap<&str, Value> = HashMap::with_capacity(self.params.len());

        for (i, field) in self.indexed.iter().enumerate() {
            let raw = topics
                .get(i + 1)
                .ok_or_else(|| AbiError::MissingTopic { field: field.clone() })?;
            let tag = self
                .params
                .get(field)
                .ok_or_else(|| AbiError::MissingTopic { field: field.clone() })?;
            let topic = codec::parse_topic(raw)?;
            values.insert(field.as_str(), codec::decode_topic(tag, &topic)?);
        }

        let data = log.data();
        if data != "0x" {
            let (names, tags): (Vec<&str>, Vec<TypeTag>) = self
                .params
                .iter()
                .filter(|(n, _)| !self.is_indexed(n))
                .map(|(n, t)| (n, t.clone()))
                .unzip();
            if !tags.is_empty() {
                let bytes = chaincall_core::encoding::from_hex(data)?;
                let decoded = codec::decode(&tags, &bytes)?;
                values.extend(names.into_iter().zip(decoded));
            }
        }

        tracing::trace!(event = %self.name, fields = values.len(), "decoded log");
        let mut out = Record::with_capacity(values.len());
        for name in self.params.names() {
            if let Some(v) = values.remove(name) {
                out.insert(name.to_string(), v);
            }
        }
        Ok(out)
    }
}
