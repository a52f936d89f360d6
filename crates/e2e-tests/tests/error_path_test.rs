//! Error path tests: every failure rolls the whole batch back.

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use e2e_tests::{TestHarness, ERN_TABLES};
use meta_indexing::{cid_channel, CidStream, IndexingError};
use meta_types::Cid;

async fn assert_index_empty(harness: &TestHarness) {
    for table in ERN_TABLES {
        assert_eq!(harness.count(table).await, 0, "table {table} should be empty");
    }
}

#[tokio::test]
async fn test_nth_document_failure_rolls_back_earlier_documents() {
    let harness = TestHarness::new();
    let ern = harness.ern();
    let good_a = ern.simple_message("MSG-A", &[], &[ern.release(None, "A")]);
    let good_b = ern.simple_message(
        "MSG-B",
        &[ern.sound_recording(Some("CASE00000010"), Some("B"), &[])],
        &[],
    );
    let untitled = ern.sound_recording(Some("CASE00000011"), None, &[]);
    let bad = ern.simple_message("MSG-C", &[untitled], &[]);

    let err = harness.index_ern(&[good_a, good_b, bad]).await.unwrap_err();
    assert!(matches!(err, IndexingError::Schema(_)), "got {err}");
    assert_index_empty(&harness).await;
}

#[tokio::test]
async fn test_sender_cardinality() {
    let harness = TestHarness::new();
    let ern = harness.ern();
    let label_a = ern.party("Label A", None);
    let label_b = ern.party("Label B", None);
    let dsp = ern.party("DSP", None);

    let none = ern.message(Some(ern.header("MSG-0", &[], &[dsp])), &[], &[], &[]);
    let two = ern.message(
        Some(ern.header("MSG-2", &[label_a, label_b], &[dsp])),
        &[],
        &[],
        &[],
    );
    let one = ern.message(Some(ern.header("MSG-1", &[label_a], &[dsp])), &[], &[], &[]);

    for (doc, senders) in [(none, 0usize), (two, 2)] {
        match harness.index_ern(&[doc]).await.unwrap_err() {
            IndexingError::Cardinality {
                field,
                expected,
                got,
            } => {
                assert_eq!(field, "MessageSender");
                assert_eq!(expected, 1);
                assert_eq!(got, senders);
            }
            other => panic!("expected cardinality error, got {other}"),
        }
        assert_index_empty(&harness).await;
    }

    harness.index_ern(&[one]).await.unwrap();
    assert_eq!(harness.count("ern").await, 1);
}

#[tokio::test]
async fn test_missing_recipient_is_cardinality_error() {
    let harness = TestHarness::new();
    let ern = harness.ern();
    let sender = ern.party("Label A", None);
    let doc = ern.message(Some(ern.header("MSG-1", &[sender], &[])), &[], &[], &[]);

    let err = harness.index_ern(&[doc]).await.unwrap_err();
    assert!(matches!(
        err,
        IndexingError::Cardinality { ref field, got: 0, .. } if field == "MessageRecipient"
    ));
}

#[tokio::test]
async fn test_unknown_root_is_storage_error() {
    let harness = TestHarness::new();
    let ern = harness.ern();
    let good = ern.simple_message("MSG-A", &[], &[ern.release(None, "A")]);

    let err = harness
        .index_ern(&[good, Cid::of(b"never stored")])
        .await
        .unwrap_err();
    assert!(matches!(err, IndexingError::Storage(_)));
    assert!(!err.is_cancelled());
    assert_index_empty(&harness).await;
}

#[tokio::test]
async fn test_stream_terminal_error_rolls_back() {
    let harness = TestHarness::new();
    let ern = harness.ern();
    let good = ern.simple_message("MSG-A", &[], &[ern.release(None, "A")]);

    let input = format!("{good}\nnot-a-content-id\n");
    let stream = CidStream::from_reader(std::io::Cursor::new(input.into_bytes()), 4);
    let err = harness
        .ern_indexer()
        .await
        .index(&CancellationToken::new(), stream)
        .await
        .unwrap_err();

    assert!(matches!(err, IndexingError::Stream(_)));
    assert_index_empty(&harness).await;
}

#[tokio::test]
async fn test_cancel_mid_stream() {
    let harness = TestHarness::new();
    let ern = harness.ern();
    let first = ern.simple_message("MSG-A", &[], &[ern.release(None, "A")]);

    let cancel = CancellationToken::new();
    let done = CancellationToken::new();
    let (tx, stream) = cid_channel(1);
    let producer = tokio::spawn({
        let cancel = cancel.clone();
        let done = done.clone();
        async move {
            tx.send(first).await.unwrap();
            cancel.cancel();
            // Keep the stream open; only cancellation can end the batch
            done.cancelled().await;
        }
    });

    let err = harness
        .ern_indexer()
        .await
        .index(&cancel, stream)
        .await
        .unwrap_err();
    done.cancel();
    producer.await.unwrap();

    assert!(err.is_cancelled());
    assert_index_empty(&harness).await;
}

#[tokio::test]
async fn test_retry_whole_batch_after_failure() {
    let harness = TestHarness::new();
    let ern = harness.ern();
    let good = ern.simple_message("MSG-A", &[], &[ern.release(None, "A")]);
    let untitled = ern.sound_recording(None, None, &[]);
    let bad = ern.simple_message("MSG-B", &[untitled], &[]);

    assert!(harness.index_ern(&[good, bad]).await.is_err());

    let fixed_recording = ern.sound_recording(None, Some("Now Titled"), &[]);
    let fixed = ern.simple_message("MSG-B", &[fixed_recording], &[]);
    let stats = harness.index_ern(&[good, fixed]).await.unwrap();

    assert_eq!(stats.documents, 2);
    assert_eq!(harness.count("ern").await, 2);
    assert_eq!(harness.count("sound_recording").await, 1);
}
