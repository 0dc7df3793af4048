//! Storage Engine
//!
//! Chained-bucket map from string key to byte payload. A bucket's index is
//! `hash(key) mod MaxKey`, the same placement used for node keys, so a node
//! owns exactly the buckets in `(predecessor, own]`.
//!
//! The `MaxKey` logical buckets are kept sparsely in an ordered map: empty
//! buckets take no memory and range scans still run in bucket-index order.

// Semantic submodules
mod bucket;
mod engine;

// Re-export public API
pub use bucket::{Bucket, Entry};
pub use engine::StorageEngine;
