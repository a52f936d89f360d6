//! ReleaseList section.

use meta_types::{Cid, Object};
use rusqlite::params;

use super::required_title;
use crate::error::IndexingError;
use crate::graph::TEXT_FIELD;
use crate::indexer::IndexContext;
use crate::links::links_at;

pub(super) fn index_release_list(
    cx: &mut IndexContext<'_>,
    ern: &Cid,
    list: &Object,
) -> Result<(), IndexingError> {
    for release in links_at(list, "Release")? {
        let release = cx.load(&release)?;
        index_release(cx, ern, &release)?;
    }
    Ok(())
}

fn index_release(
    cx: &mut IndexContext<'_>,
    ern: &Cid,
    release: &Object,
) -> Result<(), IndexingError> {
    let graph = cx.graph(release);
    let grid = graph
        .optional_text(&["ReleaseId", "GRid", TEXT_FIELD])?
        .unwrap_or_default();
    let title = required_title(&graph, "Release")?;

    let cid = release.cid().to_string();
    cx.insert(
        "release",
        "INSERT INTO release (cid, id, title) VALUES (?1, ?2, ?3)",
        params![cid, grid, title],
    )?;
    cx.insert(
        "release_list",
        "INSERT INTO release_list (ern_id, release_id) VALUES (?1, ?2)",
        params![ern.to_string(), cid],
    )?;
    Ok(())
}
