//! Domain Entities for the Chord ring
//!
//! The two identities every other module is built on: a position on the
//! identifier circle and the remote handle of a ring member.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position on the identifier circle.
///
/// Valid keys are always `< KeySpace::max_key()`. The newtype does not carry
/// the key-space size; range checks live in [`crate::domain::KeySpace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key(pub u64);

impl Key {
    /// Create a key from its raw position.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw position on the circle.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Key {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle for a ring member: where to reach it and where it sits.
///
/// Two handles are the same node when both the address and the key match.
/// Handles are immutable once created; ring state swaps whole handles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteNode {
    /// Network address in `host:port` form.
    pub address: String,
    /// Ring position, `hash(address) mod MaxKey`.
    pub key: Key,
}

impl RemoteNode {
    /// Create a handle from an address and its ring position.
    pub fn new(address: impl Into<String>, key: Key) -> Self {
        Self {
            address: address.into(),
            key,
        }
    }
}

impl fmt::Display for RemoteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.address, self.key)
    }
}
