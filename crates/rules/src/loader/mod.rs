//! Filesystem document store.
//!
//! Scans a directory for YAML documents of every kind via two-pass
//! deserialization (DocumentEnvelope -> Document) and writes scenarios
//! back atomically.

mod error;
mod store;


pub use self::error::{LoadError, LoadResult, LoadStatus, Result};
pub use self::store::DocumentStore;
