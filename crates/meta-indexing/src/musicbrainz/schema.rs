//! Index tables for MusicBrainz artists.
//!
//! Indexed properties:
//!
//! - Name: <https://musicbrainz.org/doc/Artist#Name>
//! - Type: <https://musicbrainz.org/doc/Artist#Type>
//! - MBID: <https://musicbrainz.org/doc/Artist#MBID>
//! - IPI: <https://musicbrainz.org/doc/Artist#IPI_code>
//! - ISNI: <https://musicbrainz.org/doc/Artist#ISNI_code>

use meta_migrate::Migrations;

/// Name of the artist migration list.
pub const MIGRATIONS_NAME: &str = "musicbrainz";

/// The artist schema, oldest version first. Append only.
pub fn migrations() -> Migrations {
    Migrations::new(MIGRATIONS_NAME)
        .with(
            1,
            "
CREATE TABLE artist (
    object_id text NOT NULL,
    name      text NOT NULL,
    type      text NOT NULL,
    mbid      text NOT NULL
);

CREATE INDEX artist_object_id_idx ON artist (object_id);
CREATE INDEX artist_name_idx      ON artist (name);
CREATE INDEX artist_type_idx      ON artist (type);
CREATE INDEX artist_mbid_idx      ON artist (mbid);

CREATE TABLE artist_ipi (
    object_id text NOT NULL,
    ipi       text NOT NULL
);

CREATE INDEX artist_ipi_idx ON artist_ipi (ipi);

CREATE TABLE artist_isni (
    object_id text NOT NULL,
    isni      text NOT NULL
);

CREATE INDEX artist_isni_idx ON artist_isni (isni);
",
        )
        // Re-indexing an artist must not duplicate its rows
        .with(
            2,
            "
CREATE UNIQUE INDEX artist_object_id_uniq   ON artist (object_id);
CREATE UNIQUE INDEX artist_ipi_object_uniq  ON artist_ipi (object_id, ipi);
CREATE UNIQUE INDEX artist_isni_object_uniq ON artist_isni (object_id, isni);
",
        )
}
