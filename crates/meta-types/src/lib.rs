//! # meta-types
//!
//! Shared domain types for the META indexing pipeline.
//!
//! This crate defines the data model every other crate works against:
//! - [`Cid`]: content identifier, the BLAKE3 digest of an object's canonical encoding
//! - [`Value`]: field values, including [`Value::Link`] references to other objects
//! - [`Object`]: immutable, content-addressed field maps forming a DAG
//! - [`Settings`]: layered configuration for stores and indexes
//!
//! ## Usage
//!
//! ```rust
//! use meta_types::{Object, Value};
//!
//! let title = Object::from_fields([("@value", Value::from("Bad Love"))]);
//! let recording = Object::from_fields([("ReferenceTitle", Value::Link(title.cid()))]);
//! assert_ne!(title.cid(), recording.cid());
//! ```

pub mod cid;
pub mod config;
pub mod error;
pub mod object;
pub mod value;

pub use cid::Cid;
pub use config::Settings;
pub use error::MetaError;
pub use object::Object;
pub use value::Value;
