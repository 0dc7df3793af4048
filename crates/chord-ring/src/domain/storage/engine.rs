use super::{Bucket, Entry};
use crate::domain::{Key, KeySpace};
use std::collections::BTreeMap;

/// Local key-value store of one node.
#[derive(Debug, Clone)]
pub struct StorageEngine {
    space: KeySpace,
    buckets: BTreeMap<u64, Bucket>,
    entries: usize,
}

impl StorageEngine {
    pub fn new(space: KeySpace) -> Self {
        Self {
            space,
            buckets: BTreeMap::new(),
            entries: 0,
        }
    }

    /// Ring position (bucket index) of a string key.
    pub fn bucket_index(&self, key: &str) -> Key {
        self.space.hash(key)
    }

    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) {
        let key = key.into();
        let index = self.bucket_index(&key);
        let overwritten = self.buckets.entry(index.0).or_default().upsert(key, value);
        if !overwritten {
            self.entries += 1;
        }
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        let index = self.bucket_index(key);
        self.buckets
            .get(&index.0)
            .and_then(|bucket| bucket.find(key))
            .map(|entry| entry.value.as_slice())
    }

    /// Every entry whose bucket index lies in `(start, end]`, in bucket-index
    /// order then chain order.
    pub fn get_range(&self, start: Key, end: Key) -> Vec<(String, Vec<u8>)> {
        self.space.assert_contains(start);
        self.space.assert_contains(end);

        self.buckets
            .iter()
            .filter(|(index, _)| self.space.between_end_inclusive(Key(**index), start, end))
            .flat_map(|(_, bucket)| bucket.entries())
            .map(|Entry { key, value }| (key.clone(), value.clone()))
            .collect()
    }

    /// Write every pair, overwriting duplicates. Returns the number written.
    pub fn merge(&mut self, entries: impl IntoIterator<Item = (String, Vec<u8>)>) -> usize {
        let mut written = 0;
        for (key, value) in entries {
            self.put(key, value);
            written += 1;
        }
        written
    }

    pub fn bucket(&self, index: Key) -> Option<&Bucket> {
        self.buckets.get(&index.0)
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}
