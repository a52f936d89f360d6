//! DDEX ERN (Electronic Release Notification) indexer.
//!
//! A root document holds a single `NewReleaseMessage` whose top-level
//! sections are all optional:
//!
//! - `MessageHeader`: sender and recipient parties, message identifiers
//! - `WorkList`: musical works, keyed by ISWC
//! - `ResourceList`: sound recordings, keyed by ISRC, with display artists
//! - `ReleaseList`: releases, keyed by GRid
//!
//! Sections are indexed in that order. An absent section is skipped; any other
//! failure aborts the document, and with it the batch.

mod header;
mod parties;
mod releases;
mod resources;
pub mod schema;
mod works;

use meta_migrate::Migrations;
use meta_types::{Cid, Object, Value};
use tracing::debug;

use crate::error::IndexingError;
use crate::graph::{Graph, TEXT_FIELD};
use crate::indexer::{DocumentIndexer, IndexContext};

/// Root field of every ERN document.
pub const MESSAGE_FIELD: &str = "NewReleaseMessage";

/// Top-level sections of a release notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    MessageHeader,
    WorkList,
    ResourceList,
    ReleaseList,
}

impl Section {
    /// Every section, in indexing order.
    pub const ALL: [Section; 4] = [
        Section::MessageHeader,
        Section::WorkList,
        Section::ResourceList,
        Section::ReleaseList,
    ];

    pub fn field(self) -> &'static str {
        match self {
            Section::MessageHeader => "MessageHeader",
            Section::WorkList => "WorkList",
            Section::ResourceList => "ResourceList",
            Section::ReleaseList => "ReleaseList",
        }
    }

    fn index(
        self,
        cx: &mut IndexContext<'_>,
        ern: &Cid,
        section: &Object,
    ) -> Result<(), IndexingError> {
        match self {
            Section::MessageHeader => header::index_message_header(cx, ern, section),
            Section::WorkList => works::index_work_list(cx, ern, section),
            Section::ResourceList => resources::index_resource_list(cx, ern, section),
            Section::ReleaseList => releases::index_release_list(cx, ern, section),
        }
    }
}

/// Indexes ERN documents into the tables of [`schema::migrations`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ErnIndexer;

impl ErnIndexer {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentIndexer for ErnIndexer {
    fn name(&self) -> &str {
        "ern"
    }

    fn migrations(&self) -> Migrations {
        schema::migrations()
    }

    fn index_document(
        &self,
        cx: &mut IndexContext<'_>,
        document: &Object,
    ) -> Result<(), IndexingError> {
        let ern = document.cid();

        for section in Section::ALL {
            let field = section.field();
            let value = match cx.graph(document).get(&[MESSAGE_FIELD, field]) {
                Ok(value) => value,
                Err(e) if e.is_path_not_found() => {
                    debug!(cid = %ern, section = field, "Section absent");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let cid = match value {
                Value::Link(cid) => cid,
                other => {
                    return Err(IndexingError::schema(format!(
                        "{MESSAGE_FIELD}.{field}: expected a link, got {}",
                        other.kind()
                    )))
                }
            };
            let object = cx.load(&cid)?;
            section.index(cx, &ern, &object)?;
        }

        Ok(())
    }
}

/// `ReferenceTitle.TitleText`, which must be present and non-empty.
fn required_title(graph: &Graph<'_>, kind: &str) -> Result<String, IndexingError> {
    match graph.optional_text(&["ReferenceTitle", "TitleText", TEXT_FIELD])? {
        Some(title) if !title.is_empty() => Ok(title),
        _ => Err(IndexingError::schema(format!(
            "{kind} {} missing ReferenceTitle",
            graph.root().cid()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Indexer;
    use crate::stream::CidStream;
    use crate::testutil::{link, text_node, Fixture};
    use tokio_util::sync::CancellationToken;

    fn text(fx: &Fixture, s: &str) -> Value {
        link(fx.put(text_node(s)))
    }

    fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
        Value::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn links(cids: &[Cid]) -> Value {
        match cids {
            [single] => link(*single),
            many => Value::List(many.iter().copied().map(link).collect()),
        }
    }

    fn party(fx: &Fixture, name: &str, id: Option<&str>) -> Cid {
        let mut fields = vec![("PartyName", map([("FullName", text(fx, name))]))];
        if let Some(id) = id {
            fields.push(("PartyId", text(fx, id)));
        }
        fx.put(Object::from_fields(fields))
    }

    fn header(fx: &Fixture, senders: &[Cid], recipients: &[Cid]) -> Cid {
        let mut fields = vec![
            ("MessageId", text(fx, "MSG-1")),
            ("MessageThreadId", text(fx, "THREAD-1")),
            ("MessageCreatedDateTime", text(fx, "2017-03-01T10:00:00Z")),
        ];
        if !senders.is_empty() {
            fields.push(("MessageSender", links(senders)));
        }
        if !recipients.is_empty() {
            fields.push(("MessageRecipient", links(recipients)));
        }
        fx.put(Object::from_fields(fields))
    }

    fn titled(fx: &Fixture, id_field: (&str, &str, Option<&str>), title: Option<&str>) -> Vec<(String, Value)> {
        let mut fields = Vec::new();
        if let (outer, inner, Some(id)) = id_field {
            fields.push((outer.to_string(), map([(inner, text(fx, id))])));
        }
        if let Some(title) = title {
            fields.push((
                "ReferenceTitle".to_string(),
                map([("TitleText", text(fx, title))]),
            ));
        }
        fields
    }

    fn recording(fx: &Fixture, isrc: Option<&str>, title: Option<&str>, artists: &[Cid]) -> Cid {
        let mut fields = titled(fx, ("SoundRecordingId", "ISRC", isrc), title);
        if !artists.is_empty() {
            let details = fx.put(Object::from_fields([("DisplayArtist", links(artists))]));
            fields.push(("SoundRecordingDetailsByTerritory".to_string(), link(details)));
        }
        fx.put(Object::from_fields(fields))
    }

    fn release(fx: &Fixture, grid: Option<&str>, title: &str) -> Cid {
        fx.put(Object::from_fields(titled(
            fx,
            ("ReleaseId", "GRid", grid),
            Some(title),
        )))
    }

    fn ern(fx: &Fixture, sections: Vec<(&str, Value)>) -> Cid {
        let message = fx.put(Object::from_fields(sections));
        fx.put(Object::from_fields([(MESSAGE_FIELD, link(message))]))
    }

    fn list(fx: &Fixture, field: &str, cids: &[Cid]) -> Value {
        link(fx.put(Object::from_fields([(field, links(cids))])))
    }

    fn standard_header(fx: &Fixture) -> Value {
        let sender = party(fx, "Label A", Some("PADPIDA2014120301K"));
        let recipient = party(fx, "DSP B", Some("PADPIDA2014120302L"));
        link(header(fx, &[sender], &[recipient]))
    }

    async fn index(fx: &Fixture, roots: Vec<Cid>) -> Result<crate::IndexStats, IndexingError> {
        let indexer = Indexer::new(fx.index.clone(), fx.store_handle(), ErnIndexer::new())
            .await
            .unwrap();
        indexer
            .index(&CancellationToken::new(), CidStream::from_cids(roots))
            .await
    }

    #[tokio::test]
    async fn test_full_message() {
        let fx = Fixture::new();
        let artist = party(&fx, "Some Artist", None);
        let track = recording(&fx, Some("CASE00000001"), Some("Track One"), &[artist]);
        let album = release(&fx, Some("A1UCASE0000000401X"), "Album One");
        let work = fx.put(Object::from_fields([
            ("MusicalWorkId", map([("ISWC", text(&fx, "T-034.524.680-1"))])),
            ("ReferenceTitle", map([("TitleText", text(&fx, "Work One"))])),
        ]));
        let root = ern(
            &fx,
            vec![
                ("MessageHeader", standard_header(&fx)),
                ("WorkList", list(&fx, "MusicalWork", &[work])),
                ("ResourceList", list(&fx, "SoundRecording", &[track])),
                ("ReleaseList", list(&fx, "Release", &[album])),
            ],
        );

        let stats = index(&fx, vec![root]).await.unwrap();
        assert_eq!(stats.documents, 1);

        assert_eq!(
            fx.column("SELECT message_id FROM ern").await,
            vec!["MSG-1"]
        );
        assert_eq!(
            fx.column("SELECT name FROM party ORDER BY name").await,
            vec!["DSP B", "Label A", "Some Artist"]
        );
        assert_eq!(
            fx.column("SELECT id || ':' || title FROM sound_recording").await,
            vec!["CASE00000001:Track One"]
        );
        assert_eq!(
            fx.column("SELECT id || ':' || title FROM release").await,
            vec!["A1UCASE0000000401X:Album One"]
        );
        assert_eq!(
            fx.column("SELECT id || ':' || title FROM musical_work").await,
            vec!["T-034.524.680-1:Work One"]
        );
        assert_eq!(
            fx.column("SELECT ern_id || '>' || resource_id FROM resource_list").await,
            vec![format!("{root}>{track}")]
        );
        assert_eq!(
            fx.column("SELECT party_id FROM sound_recording_artist").await,
            vec![artist.to_string()]
        );
        assert_eq!(fx.column("SELECT work_id FROM work_list").await, vec![work.to_string()]);
    }

    #[tokio::test]
    async fn test_absent_sections_skipped() {
        let fx = Fixture::new();
        let root = ern(&fx, vec![("MessageHeader", standard_header(&fx))]);

        index(&fx, vec![root]).await.unwrap();
        assert_eq!(fx.index.row_count("ern").await.unwrap(), 1);
        assert_eq!(fx.index.row_count("release").await.unwrap(), 0);
        assert_eq!(fx.index.row_count("sound_recording").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sender_cardinality() {
        for senders in [0usize, 2] {
            let fx = Fixture::new();
            let parties: Vec<Cid> = (0..senders)
                .map(|i| party(&fx, &format!("Sender {i}"), None))
                .collect();
            let recipient = party(&fx, "DSP B", None);
            let root = ern(
                &fx,
                vec![("MessageHeader", link(header(&fx, &parties, &[recipient])))],
            );

            match index(&fx, vec![root]).await.unwrap_err() {
                IndexingError::Cardinality { field, expected, got } => {
                    assert_eq!(field, "MessageSender");
                    assert_eq!(expected, 1);
                    assert_eq!(got, senders);
                }
                other => panic!("unexpected error: {other}"),
            }
            assert_eq!(fx.index.row_count("party").await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_recipient_cardinality() {
        let fx = Fixture::new();
        let sender = party(&fx, "Label A", None);
        let a = party(&fx, "DSP A", None);
        let b = party(&fx, "DSP B", None);
        let root = ern(
            &fx,
            vec![("MessageHeader", link(header(&fx, &[sender], &[a, b])))],
        );

        let err = index(&fx, vec![root]).await.unwrap_err();
        assert!(matches!(
            err,
            IndexingError::Cardinality { ref field, got: 2, .. } if field == "MessageRecipient"
        ));
    }

    #[tokio::test]
    async fn test_optional_identifiers_default_to_empty() {
        let fx = Fixture::new();
        let artist = party(&fx, "No Id Artist", None);
        let track = recording(&fx, None, Some("Untitled Demo"), &[artist]);
        let album = release(&fx, None, "Demo Tape");
        let root = ern(
            &fx,
            vec![
                ("ResourceList", list(&fx, "SoundRecording", &[track])),
                ("ReleaseList", list(&fx, "Release", &[album])),
            ],
        );

        index(&fx, vec![root]).await.unwrap();
        assert_eq!(fx.column("SELECT id FROM sound_recording").await, vec![""]);
        assert_eq!(fx.column("SELECT id FROM release").await, vec![""]);
        assert_eq!(fx.column("SELECT id FROM party").await, vec![""]);
    }

    #[tokio::test]
    async fn test_missing_title_fails_document() {
        let fx = Fixture::new();
        let track = recording(&fx, Some("CASE00000002"), None, &[]);
        let root = ern(
            &fx,
            vec![("ResourceList", list(&fx, "SoundRecording", &[track]))],
        );

        let err = index(&fx, vec![root]).await.unwrap_err();
        assert!(matches!(err, IndexingError::Schema(ref m) if m.contains("ReferenceTitle")));
    }

    #[tokio::test]
    async fn test_section_must_be_link() {
        let fx = Fixture::new();
        let root = ern(&fx, vec![("ReleaseList", Value::from("inline"))]);

        let err = index(&fx, vec![root]).await.unwrap_err();
        assert!(matches!(err, IndexingError::Schema(_)));
    }

    #[tokio::test]
    async fn test_work_title_fallback() {
        let fx = Fixture::new();
        let work = fx.put(Object::from_fields([(
            "Title",
            map([("TitleText", text(&fx, "Old Style Title"))]),
        )]));
        let root = ern(&fx, vec![("WorkList", list(&fx, "MusicalWork", &[work]))]);

        index(&fx, vec![root]).await.unwrap();
        assert_eq!(
            fx.column("SELECT title FROM musical_work").await,
            vec!["Old Style Title"]
        );
    }

    #[tokio::test]
    async fn test_party_with_several_ids_uses_first() {
        let fx = Fixture::new();
        let artist = fx.put(Object::from_fields([
            ("PartyName", map([("FullName", text(&fx, "Multi Id"))])),
            (
                "PartyId",
                Value::List(vec![text(&fx, "ID-1"), text(&fx, "ID-2")]),
            ),
        ]));
        let track = recording(&fx, None, Some("Track"), &[artist]);
        let root = ern(
            &fx,
            vec![("ResourceList", list(&fx, "SoundRecording", &[track]))],
        );

        index(&fx, vec![root]).await.unwrap();
        assert_eq!(fx.column("SELECT id FROM party").await, vec!["ID-1"]);
    }

    #[test]
    fn test_section_order() {
        let fields: Vec<&str> = Section::ALL.iter().map(|s| s.field()).collect();
        assert_eq!(
            fields,
            vec!["MessageHeader", "WorkList", "ResourceList", "ReleaseList"]
        );
    }
}
