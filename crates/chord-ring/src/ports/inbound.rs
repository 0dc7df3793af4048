//! # Inbound Ports (Driving Side)
//!
//! [`ChordApi`] is what every node offers its peers. [`RequestHandler`] is
//! what a transport registers for inbound calls; [`dispatch`] bridges the two.

use crate::domain::{
    ChordError, ChordRequest, ChordResponse, Key, KeyLookup, KeySpace, PutOutcome, RemoteNode,
};
use async_trait::async_trait;

/// Operations exposed by every node.
#[async_trait]
pub trait ChordApi: Send + Sync {
    /// Resolve the node owning `target`, forwarding through fingers if needed.
    async fn find_successor(&self, target: Key) -> Result<RemoteNode, ChordError>;

    /// `candidate` believes it is our predecessor.
    async fn notify(&self, candidate: RemoteNode);

    /// Current predecessor, or the node itself when unknown.
    fn get_predecessor(&self) -> RemoteNode;

    /// Liveness probe; echoes `probe`.
    fn is_alive(&self, probe: bool) -> bool;

    /// Store an entry if its key falls in `(predecessor, own]`.
    async fn put_key(&self, key: String, value: Vec<u8>) -> PutOutcome;

    /// Read an entry if its key falls in `(predecessor, own]`.
    fn get_key(&self, key: &str) -> KeyLookup;

    /// Store a replica without checking ownership.
    fn put_key_backup(&self, key: String, value: Vec<u8>);

    /// Entries whose bucket index lies in `(start, end]`.
    fn get_key_range(&self, start: Key, end: Key) -> Result<Vec<(String, Vec<u8>)>, ChordError>;

    /// Key space the node operates in.
    fn key_space(&self) -> KeySpace;
}

/// Entry point registered with a transport.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, request: ChordRequest) -> ChordResponse;
}

/// Route a decoded request to the matching [`ChordApi`] operation.
///
/// Keys arriving from the network are range-checked here; an out-of-range
/// key is answered with a fault instead of reaching the interval math.
pub async fn dispatch<A>(api: &A, request: ChordRequest) -> ChordResponse
where
    A: ChordApi + ?Sized,
{
    let space = api.key_space();
    match request {
        ChordRequest::FindSuccessor(target) => {
            let result = match space.check(target) {
                Ok(target) => api.find_successor(target).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(node) => ChordResponse::Node(node),
                Err(e) => ChordResponse::Fault(e.to_string()),
            }
        }
        ChordRequest::Notify(candidate) => match space.check(candidate.key) {
            Ok(_) => {
                api.notify(candidate).await;
                ChordResponse::Ack
            }
            Err(e) => ChordResponse::Fault(e.to_string()),
        },
        ChordRequest::GetPredecessor => ChordResponse::Node(api.get_predecessor()),
        ChordRequest::IsAlive(probe) => ChordResponse::Alive(api.is_alive(probe)),
        ChordRequest::PutKey { key, value } => match api.put_key(key, value).await {
            PutOutcome::Stored => ChordResponse::Ack,
            PutOutcome::NotMine => ChordResponse::NotMine,
        },
        ChordRequest::GetKey(key) => match api.get_key(&key) {
            KeyLookup::Found(value) => ChordResponse::Value(Some(value)),
            KeyLookup::Missing => ChordResponse::Value(None),
            KeyLookup::NotMine => ChordResponse::NotMine,
        },
        ChordRequest::PutKeyBackup { key, value } => {
            api.put_key_backup(key, value);
            ChordResponse::Ack
        }
        ChordRequest::GetKeyRange { start, end } => match api.get_key_range(start, end) {
            Ok(entries) => ChordResponse::Entries(entries),
            Err(e) => ChordResponse::Fault(e.to_string()),
        },
    }
}
