//! Normalization of relationship fields.
//!
//! A field that may hold one or several links (a release's resources, a
//! message's senders) is stored either as a single link or as a list of links
//! depending on how many there are. [`LinkSet`] gives callers one shape.

use meta_types::{Cid, Object, Value};

use crate::error::IndexingError;

/// A relationship field's links, as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSet {
    Single(Cid),
    Many(Vec<Cid>),
}

impl LinkSet {
    /// Read a relationship value. Anything other than a link or a list of
    /// links is a schema violation, including a list with a non-link element.
    pub fn from_value(field: &str, value: &Value) -> Result<Self, IndexingError> {
        match value {
            Value::Link(cid) => Ok(LinkSet::Single(*cid)),
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Link(cid) => Ok(*cid),
                    other => Err(IndexingError::schema(format!(
                        "{field}[{i}]: expected a link, got {}",
                        other.kind()
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(LinkSet::Many),
            other => Err(IndexingError::schema(format!(
                "{field}: expected a link or a list of links, got {}",
                other.kind()
            ))),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LinkSet::Single(_) => 1,
            LinkSet::Many(cids) => cids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten to an ordered sequence; a single link becomes a one-element list.
    pub fn into_cids(self) -> Vec<Cid> {
        match self {
            LinkSet::Single(cid) => vec![cid],
            LinkSet::Many(cids) => cids,
        }
    }
}

/// Normalize a relationship value to its links, preserving order.
pub fn normalize(field: &str, value: &Value) -> Result<Vec<Cid>, IndexingError> {
    LinkSet::from_value(field, value).map(LinkSet::into_cids)
}

/// Links held by `object.field`. An absent field holds no links.
pub fn links_at(object: &Object, field: &str) -> Result<Vec<Cid>, IndexingError> {
    match object.get(field) {
        Some(value) => normalize(field, value),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_link() {
        let cid = Cid::of(b"recording");
        let set = LinkSet::from_value("SoundRecording", &Value::Link(cid)).unwrap();
        assert_eq!(set, LinkSet::Single(cid));
        assert_eq!(set.len(), 1);
        assert_eq!(set.into_cids(), vec![cid]);
    }

    #[test]
    fn test_single_link_matches_one_element_list() {
        let cid = Cid::of(b"party");
        let single = normalize("MessageSender", &Value::Link(cid)).unwrap();
        let list = normalize("MessageSender", &Value::List(vec![Value::Link(cid)])).unwrap();
        assert_eq!(single, list);
        assert_eq!(single, vec![cid]);
    }

    #[test]
    fn test_list_preserves_order() {
        let a = Cid::of(b"a");
        let b = Cid::of(b"b");
        let c = Cid::of(b"c");
        let value = Value::List(vec![Value::Link(c), Value::Link(a), Value::Link(b)]);
        assert_eq!(normalize("Release", &value).unwrap(), vec![c, a, b]);
    }

    #[test]
    fn test_empty_list() {
        let set = LinkSet::from_value("Release", &Value::List(vec![])).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_non_link_element_rejected() {
        let value = Value::List(vec![Value::Link(Cid::of(b"a")), Value::from("b")]);
        let err = normalize("Release", &value).unwrap_err();
        assert!(matches!(err, IndexingError::Schema(ref m) if m.contains("Release[1]")));
    }

    #[test]
    fn test_scalar_rejected() {
        let err = normalize("MessageSender", &Value::from("Label A")).unwrap_err();
        assert!(matches!(err, IndexingError::Schema(_)));
    }

    #[test]
    fn test_links_at_absent_field() {
        let object = Object::from_fields([("other", Value::Null)]);
        assert!(links_at(&object, "DisplayArtist").unwrap().is_empty());
    }
}
