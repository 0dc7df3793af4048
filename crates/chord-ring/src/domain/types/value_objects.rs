//! Value Objects for the Chord ring
//!
//! Configuration and the typed outcomes of client-facing operations.

use crate::domain::{ChordError, KeySpace, RemoteNode};
use std::time::Duration;

/// Ring configuration consumed by the node service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordConfig {
    /// Key-space size in bits (1..=63). `MaxKey = 2^bits`.
    pub bits: u32,
    /// Period of the Stabilize loop.
    pub stabilize_interval: Duration,
    /// Period of the FixFingers loop.
    pub fix_fingers_interval: Duration,
    /// Period of the CheckPredecessor loop.
    pub check_predecessor_interval: Duration,
    /// Deadline for every remote call except liveness probes.
    pub call_timeout: Duration,
    /// Deadline for the IsAlive probe sent to the predecessor.
    pub liveness_timeout: Duration,
    /// Number of attempts made to join through the introducer.
    pub join_attempts: u32,
}

impl Default for ChordConfig {
    fn default() -> Self {
        Self {
            bits: 10,
            stabilize_interval: Duration::from_secs(1),
            fix_fingers_interval: Duration::from_secs(1),
            check_predecessor_interval: Duration::from_secs(1),
            call_timeout: Duration::from_secs(10),
            liveness_timeout: Duration::from_secs(2),
            join_attempts: 5,
        }
    }
}

impl ChordConfig {
    /// Create a configuration for testing with a wider key space and short timers.
    pub fn for_testing() -> Self {
        Self {
            bits: 16,
            stabilize_interval: Duration::from_millis(50),
            fix_fingers_interval: Duration::from_millis(50),
            check_predecessor_interval: Duration::from_millis(50),
            call_timeout: Duration::from_millis(500),
            liveness_timeout: Duration::from_millis(200),
            join_attempts: 1,
        }
    }

    /// Set the key-space size.
    #[must_use]
    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    /// Resolve the configured key space.
    pub fn key_space(&self) -> Result<KeySpace, ChordError> {
        KeySpace::new(self.bits)
    }
}

/// Result of a client-facing `PutKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The entry is stored on this node.
    Stored,
    /// The key falls outside `(predecessor, own]`; the caller must re-route.
    NotMine,
}

/// Result of a client-facing `GetKey`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLookup {
    /// The key is owned here and present.
    Found(Vec<u8>),
    /// The key is owned here but absent.
    Missing,
    /// The key falls outside `(predecessor, own]`; the caller must re-route.
    NotMine,
}

/// Point-in-time view of a node's ring state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingSnapshot {
    pub local: RemoteNode,
    pub successor: RemoteNode,
    pub predecessor: Option<RemoteNode>,
    pub fingers: Vec<Option<RemoteNode>>,
    pub stored_entries: usize,
}

impl RingSnapshot {
    /// Whether the node still believes it is the only ring member.
    pub fn is_solo(&self) -> bool {
        self.successor == self.local
    }
}
