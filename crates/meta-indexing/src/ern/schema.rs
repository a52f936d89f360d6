//! Index tables for ERN release notifications.
//!
//! Entity tables are keyed by content identifier and bridge tables by
//! `(parent, child)`, so repeated inserts hit a key constraint instead of
//! duplicating rows.

use meta_migrate::Migrations;

/// Name of the ERN migration list.
pub const MIGRATIONS_NAME: &str = "ern";

/// The ERN schema, oldest version first. Append only.
pub fn migrations() -> Migrations {
    Migrations::new(MIGRATIONS_NAME)
        .with(
            1,
            "
CREATE TABLE party (
    cid  text NOT NULL PRIMARY KEY,
    id   text NOT NULL,
    name text NOT NULL
);

CREATE INDEX party_id_idx   ON party (id);
CREATE INDEX party_name_idx ON party (name);

CREATE TABLE ern (
    cid          text NOT NULL PRIMARY KEY,
    message_id   text NOT NULL,
    thread_id    text NOT NULL,
    sender_id    text NOT NULL,
    recipient_id text NOT NULL,
    created      text NOT NULL
);

CREATE INDEX ern_message_id_idx   ON ern (message_id);
CREATE INDEX ern_sender_id_idx    ON ern (sender_id);
CREATE INDEX ern_recipient_id_idx ON ern (recipient_id);

CREATE TABLE sound_recording (
    cid   text NOT NULL PRIMARY KEY,
    id    text NOT NULL,
    title text NOT NULL
);

CREATE INDEX sound_recording_id_idx    ON sound_recording (id);
CREATE INDEX sound_recording_title_idx ON sound_recording (title);

CREATE TABLE resource_list (
    ern_id      text NOT NULL,
    resource_id text NOT NULL,
    PRIMARY KEY (ern_id, resource_id)
);

CREATE INDEX resource_list_resource_id_idx ON resource_list (resource_id);

CREATE TABLE release (
    cid   text NOT NULL PRIMARY KEY,
    id    text NOT NULL,
    title text NOT NULL
);

CREATE INDEX release_id_idx    ON release (id);
CREATE INDEX release_title_idx ON release (title);

CREATE TABLE release_list (
    ern_id     text NOT NULL,
    release_id text NOT NULL,
    PRIMARY KEY (ern_id, release_id)
);

CREATE INDEX release_list_release_id_idx ON release_list (release_id);
",
        )
        .with(
            2,
            "
CREATE TABLE musical_work (
    cid   text NOT NULL PRIMARY KEY,
    id    text NOT NULL,
    title text NOT NULL
);

CREATE INDEX musical_work_id_idx    ON musical_work (id);
CREATE INDEX musical_work_title_idx ON musical_work (title);

CREATE TABLE work_list (
    ern_id  text NOT NULL,
    work_id text NOT NULL,
    PRIMARY KEY (ern_id, work_id)
);

CREATE INDEX work_list_work_id_idx ON work_list (work_id);
",
        )
        .with(
            3,
            "
CREATE TABLE sound_recording_artist (
    resource_id text NOT NULL,
    party_id    text NOT NULL,
    PRIMARY KEY (resource_id, party_id)
);

CREATE INDEX sound_recording_artist_party_id_idx ON sound_recording_artist (party_id);
",
        )
}
