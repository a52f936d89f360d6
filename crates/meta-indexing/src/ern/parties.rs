//! Party extraction, shared by message headers and display artists.

use meta_types::{Cid, Object, Value};
use rusqlite::params;

use crate::error::IndexingError;
use crate::graph::{Graph, TEXT_FIELD};
use crate::indexer::IndexContext;
use crate::links::links_at;

/// Insert every party linked from `object.field` and return their
/// identifiers in document order.
pub(super) fn insert_parties(
    cx: &mut IndexContext<'_>,
    object: &Object,
    field: &str,
) -> Result<Vec<Cid>, IndexingError> {
    let parties = links_at(object, field)?;
    for party in &parties {
        insert_party(cx, party)?;
    }
    Ok(parties)
}

/// Insert the party at `object.field`, which must hold exactly one.
pub(super) fn insert_single_party(
    cx: &mut IndexContext<'_>,
    object: &Object,
    field: &str,
) -> Result<Cid, IndexingError> {
    let parties = links_at(object, field)?;
    match parties.as_slice() {
        [party] => {
            insert_party(cx, party)?;
            Ok(*party)
        }
        _ => Err(IndexingError::Cardinality {
            field: field.to_string(),
            expected: 1,
            got: parties.len(),
        }),
    }
}

fn insert_party(cx: &mut IndexContext<'_>, cid: &Cid) -> Result<(), IndexingError> {
    let party = cx.load(cid)?;
    let graph = cx.graph(&party);
    let name = graph.text(&["PartyName", "FullName", TEXT_FIELD])?;
    let id = party_id(&graph)?;

    cx.insert(
        "party",
        "INSERT INTO party (cid, id, name) VALUES (?1, ?2, ?3)",
        params![cid.to_string(), id, name],
    )?;
    Ok(())
}

/// The party's first identifier, or empty if it has none.
fn party_id(graph: &Graph<'_>) -> Result<String, IndexingError> {
    let value = match graph.get(&["PartyId"]) {
        Ok(value) => value,
        Err(e) if e.is_path_not_found() => return Ok(String::new()),
        Err(e) => return Err(e),
    };
    let first = match value {
        Value::List(ids) => match ids.into_iter().next() {
            Some(id) => id,
            None => return Ok(String::new()),
        },
        other => other,
    };
    match graph.get_in(&first, &[TEXT_FIELD]) {
        Ok(Value::String(id)) => Ok(id),
        Ok(other) => Err(IndexingError::schema(format!(
            "PartyId.{TEXT_FIELD}: expected a string, got {}",
            other.kind()
        ))),
        Err(e) if e.is_path_not_found() => Ok(String::new()),
        Err(e) => Err(e),
    }
}
