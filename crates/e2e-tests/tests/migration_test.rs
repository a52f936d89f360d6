//! Schema migration tests against the on-disk index.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use e2e_tests::TestHarness;
use meta_indexing::{ern, musicbrainz, ArtistIndexer, ErnIndexer, Index, Indexer};

async fn schema(index: &Index) -> Vec<String> {
    index
        .read(|conn| {
            let mut stmt =
                conn.prepare("SELECT sql FROM sqlite_master WHERE sql IS NOT NULL ORDER BY name")?;
            let rows = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>();
            rows
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_migrations_run_twice_identical_schema() {
    let harness = TestHarness::new();

    assert_eq!(harness.index.migrate(&ern::schema::migrations()).await.unwrap(), 3);
    let first = schema(&harness.index).await;

    assert_eq!(harness.index.migrate(&ern::schema::migrations()).await.unwrap(), 3);
    assert_eq!(schema(&harness.index).await, first);
}

#[tokio::test]
async fn test_reopened_index_is_already_current() {
    let harness = TestHarness::new();
    harness.ern_indexer().await;
    let before = schema(&harness.index).await;

    let reopened = Arc::new(Index::open(&harness.index_path).unwrap());
    Indexer::new(reopened.clone(), harness.store(), ErnIndexer::new())
        .await
        .unwrap();
    assert_eq!(schema(&reopened).await, before);

    let versions: Vec<String> = reopened
        .read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name || ':' || version FROM schema_migrations ORDER BY name, version",
            )?;
            let rows = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>();
            rows
        })
        .await
        .unwrap();
    assert_eq!(versions, vec!["ern:1", "ern:2", "ern:3"]);
}

#[tokio::test]
async fn test_document_types_share_one_database() {
    let harness = TestHarness::new();
    harness.ern_indexer().await;
    Indexer::new(harness.index.clone(), harness.store(), ArtistIndexer::new())
        .await
        .unwrap();

    let musicbrainz = musicbrainz::schema::migrations();
    assert_eq!(
        harness.index.migrate(&musicbrainz).await.unwrap(),
        musicbrainz.latest_version()
    );
    assert_eq!(harness.count("artist").await, 0);
    assert_eq!(harness.count("release").await, 0);
}
