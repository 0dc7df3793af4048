//! Domain Errors for the Chord ring
//!
//! Failures split into two families:
//! - **Faults**: local errors such as a bad key space or a routing loop.
//!   These indicate a bug or corrupted state.
//! - **Transient**: a remote call timed out or its peer was unreachable. The
//!   ring heals these through stabilization and failover.

use crate::domain::Key;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a [`crate::ports::Transport`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No response within the per-call deadline.
    #[error("call to {address} timed out after {timeout:?}")]
    Timeout { address: String, timeout: Duration },

    /// The peer could not be reached (connection refused, no route, down).
    #[error("{address} unreachable: {reason}")]
    Unreachable { address: String, reason: String },

    /// A frame could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// The peer closed the connection before answering.
    #[error("connection to {address} closed before a response arrived")]
    Closed { address: String },
}

/// Outcome of a remote procedure call that did not produce a usable answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request never completed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The peer answered, but reported a fault of its own.
    #[error("remote fault: {0}")]
    Fault(String),

    /// The peer answered with a response that does not match the request.
    #[error("unexpected {received} response to {call}")]
    UnexpectedResponse {
        call: &'static str,
        received: &'static str,
    },
}

impl RemoteError {
    /// Whether the failure came from the transport rather than the peer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Errors surfaced by ring operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordError {
    /// Key space must be 1..=63 bits.
    #[error("invalid key space: {bits} bits (must be 1..=63)")]
    InvalidKeySpace { bits: u32 },

    /// A key at or beyond `MaxKey` was handed to the ring.
    #[error("key {key} out of range (max key {max_key})")]
    KeyOutOfRange { key: u64, max_key: u64 },

    /// Routing reached a finger slot that was never filled.
    #[error("finger {index} is uninitialized")]
    UninitializedFinger { index: usize },

    /// Routing resolved to the local node while the target lies outside
    /// `(own, successor]`.
    #[error("routing loop: no finger precedes target {target}")]
    RoutingLoop { target: Key },

    /// A remote call made on behalf of this operation failed.
    #[error("{call} to {address} failed: {source}")]
    Remote {
        call: &'static str,
        address: String,
        #[source]
        source: RemoteError,
    },
}

impl ChordError {
    /// Wrap a failed remote call.
    pub fn remote(call: &'static str, address: impl Into<String>, source: RemoteError) -> Self {
        Self::Remote {
            call,
            address: address.into(),
            source,
        }
    }

    /// Transient failures are healed by maintenance and may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Remote {
                source: RemoteError::Transport(_),
                ..
            }
        )
    }

    /// Faults indicate broken local or remote state.
    pub fn is_fault(&self) -> bool {
        !self.is_transient()
    }
}
