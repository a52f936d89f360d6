//! MusicBrainz artist indexer.
//!
//! Each root document is one flat artist record as produced by the
//! MusicBrainz converter. IPI and ISNI codes may be a single string or a
//! list, depending on how many the artist has.

pub mod schema;

use meta_migrate::Migrations;
use meta_types::Object;
use rusqlite::params;
use serde::Deserialize;

use crate::error::IndexingError;
use crate::indexer::{DocumentIndexer, IndexContext};

/// A decoded artist record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artist {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub mbid: String,
    #[serde(default)]
    pub ipi: OneOrMany,
    #[serde(default)]
    pub isni: OneOrMany,
}

/// A field holding one value or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<&str> {
        match self {
            OneOrMany::One(value) => vec![value.as_str()],
            OneOrMany::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// Indexes artist records into the tables of [`schema::migrations`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ArtistIndexer;

impl ArtistIndexer {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentIndexer for ArtistIndexer {
    fn name(&self) -> &str {
        "musicbrainz"
    }

    fn migrations(&self) -> Migrations {
        schema::migrations()
    }

    fn index_document(
        &self,
        cx: &mut IndexContext<'_>,
        document: &Object,
    ) -> Result<(), IndexingError> {
        let artist: Artist = document.decode_into().map_err(|e| {
            IndexingError::schema(format!("artist {}: {e}", document.cid()))
        })?;
        let object_id = document.cid().to_string();

        cx.insert(
            "artist",
            "INSERT INTO artist (object_id, name, type, mbid) VALUES (?1, ?2, ?3, ?4)",
            params![object_id, artist.name, artist.kind, artist.mbid],
        )?;
        for ipi in artist.ipi.to_vec() {
            cx.insert(
                "artist_ipi",
                "INSERT INTO artist_ipi (object_id, ipi) VALUES (?1, ?2)",
                params![object_id, ipi],
            )?;
        }
        for isni in artist.isni.to_vec() {
            cx.insert(
                "artist_isni",
                "INSERT INTO artist_isni (object_id, isni) VALUES (?1, ?2)",
                params![object_id, isni],
            )?;
        }
        Ok(())
    }
}
