//! WorkList section.

use meta_types::{Cid, Object};
use rusqlite::params;

use crate::error::IndexingError;
use crate::graph::{Graph, TEXT_FIELD};
use crate::indexer::IndexContext;
use crate::links::links_at;

pub(super) fn index_work_list(
    cx: &mut IndexContext<'_>,
    ern: &Cid,
    list: &Object,
) -> Result<(), IndexingError> {
    for work in links_at(list, "MusicalWork")? {
        let work = cx.load(&work)?;
        index_musical_work(cx, ern, &work)?;
    }
    Ok(())
}

fn index_musical_work(
    cx: &mut IndexContext<'_>,
    ern: &Cid,
    work: &Object,
) -> Result<(), IndexingError> {
    let graph = cx.graph(work);
    let iswc = graph
        .optional_text(&["MusicalWorkId", "ISWC", TEXT_FIELD])?
        .unwrap_or_default();
    let title = work_title(&graph)?;

    let cid = work.cid().to_string();
    cx.insert(
        "musical_work",
        "INSERT INTO musical_work (cid, id, title) VALUES (?1, ?2, ?3)",
        params![cid, iswc, title],
    )?;
    cx.insert(
        "work_list",
        "INSERT INTO work_list (ern_id, work_id) VALUES (?1, ?2)",
        params![ern.to_string(), cid],
    )?;
    Ok(())
}

/// Works carry a `ReferenceTitle` in newer messages and a plain `Title` in
/// older ones.
fn work_title(graph: &Graph<'_>) -> Result<String, IndexingError> {
    for field in ["ReferenceTitle", "Title"] {
        if let Some(title) = graph.optional_text(&[field, "TitleText", TEXT_FIELD])? {
            if !title.is_empty() {
                return Ok(title);
            }
        }
    }
    Err(IndexingError::schema(format!(
        "MusicalWork {} missing ReferenceTitle",
        graph.root().cid()
    )))
}
