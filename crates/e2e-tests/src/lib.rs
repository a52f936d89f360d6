//! End-to-end test infrastructure for the META indexer.
//!
//! Provides a shared TestHarness backed by an on-disk RocksDB object store and
//! SQLite index, plus builders for release-notification (ERN) document graphs.

use std::path::PathBuf;
use std::sync::Arc;

use meta_indexing::{
    log_filter, CidStream, ErnIndexer, Index, IndexStats, Indexer, IndexingError,
};
use meta_storage::{ObjectStore, Storage};
use meta_types::{Cid, Object, Settings, Value};
use tokio_util::sync::CancellationToken;

/// Tables written by the ERN indexer, in a fixed order for dumps.
pub const ERN_TABLES: &[&str] = &[
    "ern",
    "musical_work",
    "party",
    "release",
    "release_list",
    "resource_list",
    "sound_recording",
    "sound_recording_artist",
    "work_list",
];

/// Install a test-writer tracing subscriber once per process.
///
/// Honors `RUST_LOG`; silent by default.
pub fn init_tracing() {
    let settings = Settings {
        log_level: "off".to_string(),
        ..Settings::default()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(&settings))
        .with_test_writer()
        .try_init();
}

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Shared object store
    pub storage: Arc<Storage>,
    /// Shared relational index
    pub index: Arc<Index>,
    /// Path of the SQLite index file, for reopen tests
    pub index_path: PathBuf,
}

impl TestHarness {
    /// Create a new test harness with temp directory and both stores.
    pub fn new() -> Self {
        init_tracing();
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let storage = Arc::new(
            Storage::open(&temp_dir.path().join("objects")).expect("Failed to open test storage"),
        );
        let index_path = temp_dir.path().join("index.db");
        let index = Arc::new(Index::open(&index_path).expect("Failed to open test index"));

        Self {
            _temp_dir: temp_dir,
            storage,
            index,
            index_path,
        }
    }

    /// The object store as the driver consumes it.
    pub fn store(&self) -> Arc<dyn ObjectStore> {
        self.storage.clone()
    }

    /// Builder for ERN graphs stored in this harness.
    pub fn ern(&self) -> ErnBuilder<'_> {
        ErnBuilder {
            store: self.storage.as_ref(),
        }
    }

    /// ERN driver over this harness's stores.
    pub async fn ern_indexer(&self) -> Indexer<ErnIndexer> {
        Indexer::new(self.index.clone(), self.store(), ErnIndexer::new())
            .await
            .expect("Failed to create ERN indexer")
    }

    /// Index `roots` as one batch with a fresh ERN driver.
    pub async fn index_ern(&self, roots: &[Cid]) -> Result<IndexStats, IndexingError> {
        self.ern_indexer()
            .await
            .index(&CancellationToken::new(), CidStream::from_cids(roots.to_vec()))
            .await
    }

    /// Row count of one table.
    pub async fn count(&self, table: &str) -> u64 {
        self.index
            .row_count(table)
            .await
            .expect("Failed to count rows")
    }

    /// Results of a single-column text query, in query order.
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
            .expect("Failed to query index")
    }

    /// Every row of every ERN table, sorted, one string per row.
    pub async fn dump_ern_tables(&self) -> Vec<String> {
        let mut rows = Vec::new();
        for table in ERN_TABLES {
            let columns = self
                .column(&format!("SELECT name FROM pragma_table_info('{table}') ORDER BY cid"))
                .await;
            let sql = format!(
                "SELECT '{table}:' || {} FROM {table}",
                columns.join(" || '|' || ")
            );
            rows.extend(self.column(&sql).await);
        }
        rows.sort();
        rows
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds ERN document graphs in an object store.
///
/// Every node is stored as it is built; methods return the identifier of the
/// node they created.
pub struct ErnBuilder<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> ErnBuilder<'a> {
    /// Store an object and return its identifier.
    pub fn put(&self, object: Object) -> Cid {
        self.store.put(&object).expect("Failed to store fixture object")
    }

    /// A link to a stored text node.
    pub fn text(&self, text: &str) -> Value {
        Value::Link(self.put(Object::from_fields([("@value", Value::from(text))])))
    }

    /// A party with a full name and optional party identifier.
    pub fn party(&self, name: &str, id: Option<&str>) -> Cid {
        let mut fields = vec![("PartyName", map([("FullName", self.text(name))]))];
        if let Some(id) = id {
            fields.push(("PartyId", self.text(id)));
        }
        self.put(Object::from_fields(fields))
    }

    /// A message header with the given parties.
    pub fn header(&self, message_id: &str, senders: &[Cid], recipients: &[Cid]) -> Cid {
        let mut fields = vec![
            ("MessageId", self.text(message_id)),
            ("MessageThreadId", self.text(&format!("{message_id}-thread"))),
            ("MessageCreatedDateTime", self.text("2017-03-01T10:00:00Z")),
        ];
        if !senders.is_empty() {
            fields.push(("MessageSender", links(senders)));
        }
        if !recipients.is_empty() {
            fields.push(("MessageRecipient", links(recipients)));
        }
        self.put(Object::from_fields(fields))
    }

    /// A sound recording; `title: None` makes a schema-invalid recording.
    pub fn sound_recording(&self, isrc: Option<&str>, title: Option<&str>, artists: &[Cid]) -> Cid {
        let mut fields = Vec::new();
        if let Some(isrc) = isrc {
            fields.push(("SoundRecordingId", map([("ISRC", self.text(isrc))])));
        }
        if let Some(title) = title {
            fields.push(("ReferenceTitle", map([("TitleText", self.text(title))])));
        }
        if !artists.is_empty() {
            let details = self.put(Object::from_fields([("DisplayArtist", links(artists))]));
            fields.push(("SoundRecordingDetailsByTerritory", Value::Link(details)));
        }
        self.put(Object::from_fields(fields))
    }

    pub fn release(&self, grid: Option<&str>, title: &str) -> Cid {
        let mut fields = vec![("ReferenceTitle", map([("TitleText", self.text(title))]))];
        if let Some(grid) = grid {
            fields.push(("ReleaseId", map([("GRid", self.text(grid))])));
        }
        self.put(Object::from_fields(fields))
    }

    pub fn musical_work(&self, iswc: Option<&str>, title: &str) -> Cid {
        let mut fields = vec![("ReferenceTitle", map([("TitleText", self.text(title))]))];
        if let Some(iswc) = iswc {
            fields.push(("MusicalWorkId", map([("ISWC", self.text(iswc))])));
        }
        self.put(Object::from_fields(fields))
    }

    /// A root ERN document. Empty lists leave their section out.
    pub fn message(
        &self,
        header: Option<Cid>,
        works: &[Cid],
        recordings: &[Cid],
        releases: &[Cid],
    ) -> Cid {
        let mut sections = Vec::new();
        if let Some(header) = header {
            sections.push(("MessageHeader", Value::Link(header)));
        }
        for (section, field, cids) in [
            ("WorkList", "MusicalWork", works),
            ("ResourceList", "SoundRecording", recordings),
            ("ReleaseList", "Release", releases),
        ] {
            if !cids.is_empty() {
                let list = self.put(Object::from_fields([(field, links(cids))]));
                sections.push((section, Value::Link(list)));
            }
        }
        let message = self.put(Object::from_fields(sections));
        self.put(Object::from_fields([(
            "NewReleaseMessage",
            Value::Link(message),
        )]))
    }

    /// A complete message with a one-sender, one-recipient header.
    pub fn simple_message(&self, message_id: &str, recordings: &[Cid], releases: &[Cid]) -> Cid {
        let sender = self.party("Label A", Some("PADPIDA2014120301K"));
        let recipient = self.party("DSP B", Some("PADPIDA2014120302L"));
        let header = self.header(message_id, &[sender], &[recipient]);
        self.message(Some(header), &[], recordings, releases)
    }
}

/// A single link, or a list of links when there are several (or none).
pub fn links(cids: &[Cid]) -> Value {
    match cids {
        [single] => Value::Link(*single),
        many => Value::List(many.iter().copied().map(Value::Link).collect()),
    }
}

fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Map(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}
