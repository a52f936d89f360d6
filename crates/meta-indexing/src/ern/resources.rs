//! ResourceList section.

use meta_types::{Cid, Object};
use rusqlite::params;

use super::parties::insert_parties;
use super::required_title;
use crate::error::IndexingError;
use crate::graph::TEXT_FIELD;
use crate::indexer::IndexContext;
use crate::links::links_at;

pub(super) fn index_resource_list(
    cx: &mut IndexContext<'_>,
    ern: &Cid,
    list: &Object,
) -> Result<(), IndexingError> {
    for recording in links_at(list, "SoundRecording")? {
        let recording = cx.load(&recording)?;
        index_sound_recording(cx, ern, &recording)?;
    }
    Ok(())
}

/// Only the ISRC is indexed; other identifier kinds stay in the graph.
fn index_sound_recording(
    cx: &mut IndexContext<'_>,
    ern: &Cid,
    recording: &Object,
) -> Result<(), IndexingError> {
    let graph = cx.graph(recording);
    let isrc = graph
        .optional_text(&["SoundRecordingId", "ISRC", TEXT_FIELD])?
        .unwrap_or_default();
    let title = required_title(&graph, "SoundRecording")?;

    let mut artists = Vec::new();
    for details in links_at(recording, "SoundRecordingDetailsByTerritory")? {
        let details = cx.load(&details)?;
        artists.extend(insert_parties(cx, &details, "DisplayArtist")?);
    }

    let cid = recording.cid().to_string();
    cx.insert(
        "sound_recording",
        "INSERT INTO sound_recording (cid, id, title) VALUES (?1, ?2, ?3)",
        params![cid, isrc, title],
    )?;
    cx.insert(
        "resource_list",
        "INSERT INTO resource_list (ern_id, resource_id) VALUES (?1, ?2)",
        params![ern.to_string(), cid],
    )?;
    for artist in artists {
        cx.insert(
            "sound_recording_artist",
            "INSERT INTO sound_recording_artist (resource_id, party_id) VALUES (?1, ?2)",
            params![cid, artist.to_string()],
        )?;
    }
    Ok(())
}
