//! Content-addressed objects.
//!
//! An [`Object`] is an immutable mapping from field name to [`Value`]. Its
//! identifier is computed from the canonical encoding (JSON, keys sorted,
//! links as `{"/": "<cid>"}`), so two objects with the same fields always share
//! an identifier regardless of how they were built.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::cid::Cid;
use crate::error::MetaError;
use crate::value::Value;

/// An immutable node in a document graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    cid: Cid,
    fields: BTreeMap<String, Value>,
}

impl Object {
    /// Create an object from its fields, computing its identifier.
    pub fn new(fields: BTreeMap<String, Value>) -> Self {
        let cid = Cid::of(&encode_fields(&fields));
        Self { cid, fields }
    }

    /// Create an object from `(name, value)` pairs.
    pub fn from_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::new(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Create an object from a JSON object, recognising links.
    pub fn from_json(json: serde_json::Value) -> Result<Self, MetaError> {
        match Value::from_json(json) {
            Value::Map(fields) => Ok(Self::new(fields)),
            other => Err(MetaError::InvalidObject(format!(
                "expected a map at the object root, got {}",
                other.kind()
            ))),
        }
    }

    /// The content identifier of this object.
    pub fn cid(&self) -> Cid {
        self.cid
    }

    /// All fields of this object.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Single-level field lookup. Links are returned as-is, not dereferenced.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Canonical encoding of this object.
    pub fn encode(&self) -> Vec<u8> {
        encode_fields(&self.fields)
    }

    /// Decode an object from its encoded bytes.
    ///
    /// The identifier is recomputed from the canonical re-encoding, so callers
    /// holding an expected identifier can compare it against [`Object::cid`].
    pub fn decode(bytes: &[u8]) -> Result<Self, MetaError> {
        let json: serde_json::Value = serde_json::from_slice(bytes)?;
        Self::from_json(json)
    }

    /// Deserialize this object's fields into a typed record.
    pub fn decode_into<T: DeserializeOwned>(&self) -> Result<T, MetaError> {
        let json = Value::Map(self.fields.clone()).to_json();
        Ok(serde_json::from_value(json)?)
    }
}

fn encode_fields(fields: &BTreeMap<String, Value>) -> Vec<u8> {
    // serde_json maps are ordered by key, which makes this canonical
    let json: serde_json::Map<String, serde_json::Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect();
    serde_json::Value::Object(json).to_string().into_bytes()
}
