//! Column family definitions for RocksDB.
//!
//! - objects: Encoded objects keyed by raw 32-byte identifier (append-only, compressed)

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for encoded objects
pub const CF_OBJECTS: &str = "objects";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[CF_OBJECTS];

/// Create column family options for objects (append-only, compressed)
fn objects_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
    opts
}

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![ColumnFamilyDescriptor::new(CF_OBJECTS, objects_options())]
}
