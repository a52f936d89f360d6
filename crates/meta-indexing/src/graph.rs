//! Path resolution over linked objects.
//!
//! A path like `["NewReleaseMessage", "ResourceList"]` is resolved one segment
//! at a time starting from a root object. When an intermediate value is a link
//! it is dereferenced through the store; nested maps are walked in place. The
//! value at the final segment is returned as-is, so a trailing link stays a
//! link for the caller to follow (or not).

use std::collections::BTreeMap;

use meta_storage::ObjectStore;
use meta_types::{Object, Value};

use crate::error::IndexingError;

/// Field of a text node holding its string content.
pub const TEXT_FIELD: &str = "@value";

/// Read-only view of a document graph rooted at one object.
pub struct Graph<'a> {
    store: &'a dyn ObjectStore,
    root: &'a Object,
}

impl<'a> Graph<'a> {
    pub fn new(store: &'a dyn ObjectStore, root: &'a Object) -> Self {
        Self { store, root }
    }

    pub fn root(&self) -> &Object {
        self.root
    }

    /// Resolve `path` from the root.
    ///
    /// An empty path yields a link to the root itself. A missing segment fails
    /// with [`IndexingError::PathNotFound`] naming the path up to that segment.
    pub fn get(&self, path: &[&str]) -> Result<Value, IndexingError> {
        if path.is_empty() {
            return Ok(Value::Link(self.root.cid()));
        }
        self.walk(self.root.fields(), path, 0)
    }

    /// Resolve `path` relative to a value obtained from this graph.
    pub fn get_in(&self, start: &Value, path: &[&str]) -> Result<Value, IndexingError> {
        if path.is_empty() {
            return Ok(start.clone());
        }
        match start {
            Value::Link(cid) => {
                let object = self.store.get(cid)?;
                self.walk(object.fields(), path, 0)
            }
            Value::Map(fields) => self.walk(fields, path, 0),
            other => Err(IndexingError::schema(format!(
                "cannot resolve {} through a {}",
                path.join("."),
                other.kind()
            ))),
        }
    }

    /// Resolve `path` to an object, dereferencing a trailing link.
    pub fn object(&self, path: &[&str]) -> Result<Object, IndexingError> {
        let value = self.get(path)?;
        self.deref(&value, path)
    }

    /// Dereference a value that must be a link.
    pub fn deref(&self, value: &Value, path: &[&str]) -> Result<Object, IndexingError> {
        match value {
            Value::Link(cid) => Ok(self.store.get(cid)?),
            other => Err(IndexingError::schema(format!(
                "expected a link at {}, got {}",
                path.join("."),
                other.kind()
            ))),
        }
    }

    /// Resolve `path` to a string scalar.
    pub fn text(&self, path: &[&str]) -> Result<String, IndexingError> {
        match self.get(path)? {
            Value::String(s) => Ok(s),
            other => Err(IndexingError::schema(format!(
                "expected a string at {}, got {}",
                path.join("."),
                other.kind()
            ))),
        }
    }

    /// Like [`Graph::text`], but an absent path yields `None`.
    pub fn optional_text(&self, path: &[&str]) -> Result<Option<String>, IndexingError> {
        match self.text(path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.is_path_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn walk(
        &self,
        fields: &BTreeMap<String, Value>,
        path: &[&str],
        depth: usize,
    ) -> Result<Value, IndexingError> {
        let value = fields
            .get(path[depth])
            .ok_or_else(|| IndexingError::PathNotFound {
                path: path[..=depth].join("."),
            })?;

        if depth + 1 == path.len() {
            return Ok(value.clone());
        }

        match value {
            Value::Link(cid) => {
                let object = self.store.get(cid)?;
                self.walk(object.fields(), path, depth + 1)
            }
            Value::Map(nested) => self.walk(nested, path, depth + 1),
            other => Err(IndexingError::schema(format!(
                "cannot resolve {} through {} at {}",
                path.join("."),
                other.kind(),
                path[..=depth].join(".")
            ))),
        }
    }
}
