//! Indexing pipeline for META documents.
//!
//! This crate turns content-addressed document graphs into rows of a SQLite
//! index.
//!
//! ## Key Components
//!
//! - [`Graph`]: resolves dotted field paths across linked objects
//! - [`LinkSet`]: normalizes single-link / multi-link relationship fields
//! - [`Index`]: the SQLite index and its scoped [`IndexTx`] transaction guard
//! - [`CidStream`]: ordered, possibly asynchronous source of root identifiers
//! - [`DocumentIndexer`]: trait for document-specific field extraction
//! - [`Indexer`]: the streaming, cancellable, transactional driver
//! - [`ErnIndexer`]: DDEX ERN release notifications
//! - [`ArtistIndexer`]: MusicBrainz artist records
//!
//! ## Architecture
//!
//! 1. An [`Indexer`] is constructed over an [`Index`] and an object store; the
//!    document type's migrations run before anything else
//! 2. [`Indexer::index`] opens one transaction for the whole stream
//! 3. Each identifier is dereferenced and handed to the [`DocumentIndexer`]
//! 4. Rows are inserted idempotently, keyed by content identifier
//! 5. The transaction commits only if the stream ended cleanly
//!
//! ## Example
//!
//! ```ignore
//! use meta_indexing::{CidStream, ErnIndexer, Index, Indexer};
//! use tokio_util::sync::CancellationToken;
//!
//! let indexer = Indexer::new(index, store, ErnIndexer::new()).await?;
//! let stats = indexer
//!     .index(&CancellationToken::new(), CidStream::from_cids(cids))
//!     .await?;
//! ```

pub mod error;
pub mod ern;
pub mod graph;
pub mod index;
pub mod indexer;
pub mod links;
pub mod logging;
pub mod musicbrainz;
pub mod pipeline;
pub mod stores;
pub mod stream;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::IndexingError;
pub use ern::ErnIndexer;
pub use graph::Graph;
pub use index::{Index, IndexTx, Inserted};
pub use indexer::{DocumentIndexer, IndexContext, IndexStats};
pub use links::LinkSet;
pub use logging::log_filter;
pub use musicbrainz::ArtistIndexer;
pub use pipeline::Indexer;
pub use stores::{open_stores, Stores};
pub use stream::{cid_channel, CidSender, CidStream};
