//! Wire Protocol
//!
//! One request variant per remote operation and one response variant per
//! result shape. Every node serves every request; transports move these
//! values without inspecting them.

use crate::domain::{Key, RemoteNode};
use serde::{Deserialize, Serialize};

/// Inbound remote calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChordRequest {
    /// Resolve the node owning a key. Answered with [`ChordResponse::Node`].
    FindSuccessor(Key),
    /// "I believe I am your predecessor." Answered with [`ChordResponse::Ack`].
    Notify(RemoteNode),
    /// Answered with [`ChordResponse::Node`]; the callee itself when unknown.
    GetPredecessor,
    /// Liveness probe. Answered with [`ChordResponse::Alive`] echoing the flag.
    IsAlive(bool),
    /// Client write, subject to ownership.
    PutKey { key: String, value: Vec<u8> },
    /// Client read, subject to ownership.
    GetKey(String),
    /// Unconditional replica write.
    PutKeyBackup { key: String, value: Vec<u8> },
    /// Entries whose bucket index lies in `(start, end]`.
    GetKeyRange { start: Key, end: Key },
}

impl ChordRequest {
    /// Operation name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FindSuccessor(_) => "FindSuccessor",
            Self::Notify(_) => "Notify",
            Self::GetPredecessor => "GetPredecessor",
            Self::IsAlive(_) => "IsAlive",
            Self::PutKey { .. } => "PutKey",
            Self::GetKey(_) => "GetKey",
            Self::PutKeyBackup { .. } => "PutKeyBackup",
            Self::GetKeyRange { .. } => "GetKeyRange",
        }
    }
}

/// Replies to [`ChordRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChordResponse {
    Node(RemoteNode),
    Ack,
    Alive(bool),
    /// Result of `GetKey` on the owner: `None` when absent.
    Value(Option<Vec<u8>>),
    Entries(Vec<(String, Vec<u8>)>),
    /// The key is outside the callee's `(predecessor, own]` range.
    NotMine,
    /// The callee could not serve the request.
    Fault(String),
}

impl ChordResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Node(_) => "Node",
            Self::Ack => "Ack",
            Self::Alive(_) => "Alive",
            Self::Value(_) => "Value",
            Self::Entries(_) => "Entries",
            Self::NotMine => "NotMine",
            Self::Fault(_) => "Fault",
        }
    }
}
