//! Streams of root identifiers.
//!
//! A [`CidStream`] yields identifiers in order and may end with a terminal
//! error, which the driver inspects only after the stream is exhausted. The
//! producing side is a [`CidSender`], typically moved into a spawned task.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use meta_types::Cid;

use crate::error::IndexingError;

type ErrorSlot = Arc<Mutex<Option<String>>>;

/// Create a bounded identifier channel.
///
/// A zero `buffer` is treated as one.
pub fn cid_channel(buffer: usize) -> (CidSender, CidStream) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let error = ErrorSlot::default();
    let failed = CancellationToken::new();
    (
        CidSender {
            tx,
            error: Arc::clone(&error),
            failed: failed.clone(),
        },
        CidStream { rx, error, failed },
    )
}

/// Producing half of an identifier stream.
///
/// Clones share one stream: `fail` on any handle ends it for all of them.
#[derive(Clone)]
pub struct CidSender {
    tx: mpsc::Sender<Cid>,
    error: ErrorSlot,
    failed: CancellationToken,
}

impl CidSender {
    /// Send the next identifier, waiting for buffer space.
    ///
    /// Fails if the consuming side has gone away or the stream has failed.
    pub async fn send(&self, cid: Cid) -> Result<(), IndexingError> {
        if self.failed.is_cancelled() {
            return Err(IndexingError::Stream("identifier stream failed".to_string()));
        }
        self.tx
            .send(cid)
            .await
            .map_err(|_| IndexingError::Stream("identifier stream closed".to_string()))
    }

    /// End the stream with a terminal error.
    ///
    /// Identifiers already sent are still delivered; the error is reported
    /// once they are exhausted. Other clones of this sender cannot keep the
    /// stream open.
    pub fn fail(self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "Identifier stream failed");
        {
            let mut slot = self.error.lock().unwrap_or_else(|p| p.into_inner());
            slot.get_or_insert(message);
        }
        self.failed.cancel();
    }
}

/// Consuming half of an identifier stream.
pub struct CidStream {
    rx: mpsc::Receiver<Cid>,
    error: ErrorSlot,
    failed: CancellationToken,
}

impl CidStream {
    /// Next identifier, or `None` once every sender is gone or one has
    /// failed the stream.
    ///
    /// Cancel safe: dropping the future never loses an identifier.
    pub async fn next(&mut self) -> Option<Cid> {
        tokio::select! {
            biased;
            cid = self.rx.recv() => return cid,
            _ = self.failed.cancelled() => {}
        }
        // Buffered identifiers were sent before the failure
        self.rx.try_recv().ok()
    }

    /// The terminal error, if the stream ended with one.
    pub fn err(&self) -> Option<IndexingError> {
        let slot = self.error.lock().unwrap_or_else(|p| p.into_inner());
        slot.clone().map(IndexingError::Stream)
    }

    /// A stream over a fixed sequence of identifiers.
    pub fn from_cids<I>(cids: I) -> Self
    where
        I: IntoIterator<Item = Cid>,
    {
        let cids: Vec<Cid> = cids.into_iter().collect();
        let (tx, stream) = cid_channel(cids.len().max(1));
        for cid in cids {
            // Capacity covers every element, so this cannot fail
            let _ = tx.tx.try_send(cid);
        }
        stream
    }

    /// A stream reading one hex identifier per line.
    ///
    /// Blank lines are skipped. A malformed line or a read error ends the
    /// stream with a terminal error. A zero `buffer` is treated as one. Must
    /// be called inside a Tokio runtime.
    pub fn from_reader<R>(reader: R, buffer: usize) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, stream) = cid_channel(buffer);
        tokio::spawn(async move {
            let mut lines = reader.lines();
            let mut line_no = 0usize;
            loop {
                line_no += 1;
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        match line.parse::<Cid>() {
                            Ok(cid) => {
                                if tx.send(cid).await.is_err() {
                                    debug!("Identifier stream consumer went away");
                                    return;
                                }
                            }
                            Err(e) => {
                                tx.fail(format!("line {line_no}: {e}"));
                                return;
                            }
                        }
                    }
                    Ok(None) => return,
                    Err(e) => {
                        tx.fail(format!("line {line_no}: {e}"));
                        return;
                    }
                }
            }
        });
        stream
    }
}
