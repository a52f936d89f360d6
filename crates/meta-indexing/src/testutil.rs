//! Shared fixtures for unit tests.

use std::sync::Arc;

use meta_storage::{MemoryStore, ObjectStore};
use meta_types::{Cid, Object, Value};

use crate::graph::TEXT_FIELD;
use crate::index::Index;

pub(crate) struct Fixture {
    pub store: MemoryStore,
    pub index: Arc<Index>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            index: Arc::new(Index::open_in_memory().unwrap()),
        }
    }

    pub fn put(&self, object: Object) -> Cid {
        self.store.put(&object).unwrap()
    }

    pub fn store_handle(&self) -> Arc<dyn ObjectStore> {
        Arc::new(self.store.clone())
    }

    /// Query a single text column, ordered, for assertions.
    pub async fn column(&self, sql: &str) -> Vec<String> {
        let sql = sql.to_string();
        self.index
            .read(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>();
                rows
            })
            .await
            .unwrap()
    }
}

/// A text node: `{"@value": text}`.
pub(crate) fn text_node(text: &str) -> Object {
    Object::from_fields([(TEXT_FIELD, Value::from(text))])
}

/// Link helper for building fixtures.
pub(crate) fn link(cid: Cid) -> Value {
    Value::Link(cid)
}
