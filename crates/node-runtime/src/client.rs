//! Ring client used by the `lookup`, `put` and `get` subcommands.
//!
//! Resolves the owner of a key through any ring member, then talks to the
//! owner directly. A `NotMine` answer means the ring moved under us; the
//! client asks the rejecting node for the owner again, a bounded number of
//! times.

use chord_ring::{
    ChordConfig, ChordError, Key, KeyLookup, KeySpace, PutOutcome, RemoteCaller, RemoteError,
    RemoteNode, Transport,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Attempts made against successive owners before giving up.
pub const MAX_REROUTES: usize = 3;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{call} via {address} failed: {source}")]
    Remote {
        call: &'static str,
        address: String,
        #[source]
        source: RemoteError,
    },

    #[error("no node accepted key {key} after {attempts} attempts")]
    Unresolved { key: String, attempts: usize },

    #[error(transparent)]
    Config(#[from] ChordError),
}

fn remote<'a>(call: &'static str, address: &'a str) -> impl FnOnce(RemoteError) -> ClientError + 'a {
    move |source| ClientError::Remote {
        call,
        address: address.to_string(),
        source,
    }
}

/// Client for a ring of the given key-space size.
pub struct RingClient {
    caller: RemoteCaller,
    space: KeySpace,
}

impl RingClient {
    pub fn new(transport: Arc<dyn Transport>, config: &ChordConfig) -> Result<Self, ClientError> {
        Ok(Self {
            caller: RemoteCaller::new(transport, config.call_timeout, config.liveness_timeout),
            space: config.key_space()?,
        })
    }

    /// Ring position of a string key.
    pub fn key_of(&self, key: &str) -> Key {
        self.space.hash(key)
    }

    /// Node currently responsible for `key`, as seen from `via`.
    pub async fn lookup(&self, via: &str, key: &str) -> Result<RemoteNode, ClientError> {
        let index = self.key_of(key);
        self.caller
            .find_successor(via, index)
            .await
            .map_err(remote("FindSuccessor", via))
    }

    /// Store `key` on its owner. Returns the node that accepted it.
    pub async fn put(
        &self,
        via: &str,
        key: &str,
        value: Vec<u8>,
    ) -> Result<RemoteNode, ClientError> {
        let mut owner = self.lookup(via, key).await?;
        for attempt in 1..=MAX_REROUTES {
            let outcome = self
                .caller
                .put_key(&owner.address, key.to_string(), value.clone())
                .await
                .map_err(remote("PutKey", &owner.address))?;
            match outcome {
                PutOutcome::Stored => return Ok(owner),
                PutOutcome::NotMine => {
                    debug!(key, owner = %owner, attempt, "Owner rejected key, re-routing");
                    owner = self.lookup(&owner.address, key).await?;
                }
            }
        }
        Err(ClientError::Unresolved {
            key: key.to_string(),
            attempts: MAX_REROUTES,
        })
    }

    /// Read `key` from its owner. `Ok(None)` when the owner has no such key.
    pub async fn get(&self, via: &str, key: &str) -> Result<Option<Vec<u8>>, ClientError> {
        let mut owner = self.lookup(via, key).await?;
        for attempt in 1..=MAX_REROUTES {
            let lookup = self
                .caller
                .get_key(&owner.address, key.to_string())
                .await
                .map_err(remote("GetKey", &owner.address))?;
            match lookup {
                KeyLookup::Found(value) => return Ok(Some(value)),
                KeyLookup::Missing => return Ok(None),
                KeyLookup::NotMine => {
                    debug!(key, owner = %owner, attempt, "Owner rejected key, re-routing");
                    owner = self.lookup(&owner.address, key).await?;
                }
            }
        }
        Err(ClientError::Unresolved {
            key: key.to_string(),
            attempts: MAX_REROUTES,
        })
    }
}
