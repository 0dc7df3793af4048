//! A single bucket and its collision chain.

/// A stored item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: Vec<u8>,
}

/// Items whose keys hash to the same index, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    chain: Vec<Entry>,
}

impl Bucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.chain
    }

    /// Linear scan of the chain.
    pub fn find(&self, key: &str) -> Option<&Entry> {
        self.chain.iter().find(|entry| entry.key == key)
    }

    /// Overwrite in place if `key` is chained here, else append.
    ///
    /// Returns `true` when an existing entry was overwritten.
    pub(crate) fn upsert(&mut self, key: String, value: Vec<u8>) -> bool {
        match self.chain.iter_mut().find(|entry| entry.key == key) {
            Some(existing) => {
                existing.value = value;
                true
            }
            None => {
                self.chain.push(Entry { key, value });
                false
            }
        }
    }
}
