use super::ChordService;
use crate::domain::{ChordError, Key, KeyLookup, PutOutcome};
use tracing::{debug, warn};

impl ChordService {
    /// Store `key` if this node owns it, then mirror it to the successor.
    pub async fn put_key(&self, key: String, value: Vec<u8>) -> PutOutcome {
        let (owned, index, successor, local) = {
            let ring = self.ring.read();
            let index = ring.space().hash(&key);
            (
                ring.owns(index),
                index,
                ring.successor().clone(),
                ring.local().clone(),
            )
        };

        if !owned {
            debug!(key = %key, index = %index, "Rejected put for foreign key");
            return PutOutcome::NotMine;
        }

        self.storage.lock().put(key.clone(), value.clone());

        if successor != local {
            if let Err(e) = self
                .remote
                .put_key_backup(&successor.address, key.clone(), value)
                .await
            {
                warn!(key = %key, peer = %successor, error = %e, "Backup write failed");
            }
        }
        PutOutcome::Stored
    }

    /// Read `key` if this node owns it.
    pub fn get_key(&self, key: &str) -> KeyLookup {
        let owned = {
            let ring = self.ring.read();
            ring.owns(ring.space().hash(key))
        };
        if !owned {
            return KeyLookup::NotMine;
        }

        match self.storage.lock().get(key) {
            Some(value) => KeyLookup::Found(value.to_vec()),
            None => KeyLookup::Missing,
        }
    }

    /// Write a replica without an ownership check.
    pub fn put_key_backup(&self, key: String, value: Vec<u8>) {
        self.storage.lock().put(key, value);
    }

    /// Entries whose bucket index lies in `(start, end]`.
    pub fn get_key_range(
        &self,
        start: Key,
        end: Key,
    ) -> Result<Vec<(String, Vec<u8>)>, ChordError> {
        let space = self.space();
        space.check(start)?;
        space.check(end)?;
        Ok(self.storage.lock().get_range(start, end))
    }
}
