//! Typed remote calls.
//!
//! Each operation sends one [`ChordRequest`], waits under its declared
//! deadline and decodes the reply into the expected shape. A `Fault` reply
//! or a reply of the wrong kind becomes a [`RemoteError`].

use crate::domain::{
    ChordRequest, ChordResponse, Key, KeyLookup, PutOutcome, RemoteError, RemoteNode,
};
use crate::ports::Transport;
use std::sync::Arc;
use std::time::Duration;

/// Client half of the wire protocol.
#[derive(Clone)]
pub struct RemoteCaller {
    transport: Arc<dyn Transport>,
    call_timeout: Duration,
    liveness_timeout: Duration,
}

impl RemoteCaller {
    pub fn new(
        transport: Arc<dyn Transport>,
        call_timeout: Duration,
        liveness_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            call_timeout,
            liveness_timeout,
        }
    }

    async fn invoke(
        &self,
        address: &str,
        request: ChordRequest,
        timeout: Duration,
    ) -> Result<ChordResponse, RemoteError> {
        match self.transport.call(address, request, timeout).await? {
            ChordResponse::Fault(reason) => Err(RemoteError::Fault(reason)),
            response => Ok(response),
        }
    }

    pub async fn find_successor(&self, address: &str, target: Key) -> Result<RemoteNode, RemoteError> {
        match self
            .invoke(address, ChordRequest::FindSuccessor(target), self.call_timeout)
            .await?
        {
            ChordResponse::Node(node) => Ok(node),
            other => Err(unexpected("FindSuccessor", &other)),
        }
    }

    pub async fn notify(&self, address: &str, candidate: RemoteNode) -> Result<(), RemoteError> {
        match self
            .invoke(address, ChordRequest::Notify(candidate), self.call_timeout)
            .await?
        {
            ChordResponse::Ack => Ok(()),
            other => Err(unexpected("Notify", &other)),
        }
    }

    pub async fn get_predecessor(&self, address: &str) -> Result<RemoteNode, RemoteError> {
        match self
            .invoke(address, ChordRequest::GetPredecessor, self.call_timeout)
            .await?
        {
            ChordResponse::Node(node) => Ok(node),
            other => Err(unexpected("GetPredecessor", &other)),
        }
    }

    /// Probe with the short liveness deadline. `Ok(false)` means the peer
    /// answered but did not echo the probe.
    pub async fn is_alive(&self, address: &str) -> Result<bool, RemoteError> {
        match self
            .invoke(address, ChordRequest::IsAlive(true), self.liveness_timeout)
            .await?
        {
            ChordResponse::Alive(echo) => Ok(echo),
            other => Err(unexpected("IsAlive", &other)),
        }
    }

    pub async fn put_key(
        &self,
        address: &str,
        key: String,
        value: Vec<u8>,
    ) -> Result<PutOutcome, RemoteError> {
        match self
            .invoke(address, ChordRequest::PutKey { key, value }, self.call_timeout)
            .await?
        {
            ChordResponse::Ack => Ok(PutOutcome::Stored),
            ChordResponse::NotMine => Ok(PutOutcome::NotMine),
            other => Err(unexpected("PutKey", &other)),
        }
    }

    pub async fn get_key(&self, address: &str, key: String) -> Result<KeyLookup, RemoteError> {
        match self
            .invoke(address, ChordRequest::GetKey(key), self.call_timeout)
            .await?
        {
            ChordResponse::Value(Some(value)) => Ok(KeyLookup::Found(value)),
            ChordResponse::Value(None) => Ok(KeyLookup::Missing),
            ChordResponse::NotMine => Ok(KeyLookup::NotMine),
            other => Err(unexpected("GetKey", &other)),
        }
    }

    pub async fn put_key_backup(
        &self,
        address: &str,
        key: String,
        value: Vec<u8>,
    ) -> Result<(), RemoteError> {
        match self
            .invoke(
                address,
                ChordRequest::PutKeyBackup { key, value },
                self.call_timeout,
            )
            .await?
        {
            ChordResponse::Ack => Ok(()),
            other => Err(unexpected("PutKeyBackup", &other)),
        }
    }

    pub async fn get_key_range(
        &self,
        address: &str,
        start: Key,
        end: Key,
    ) -> Result<Vec<(String, Vec<u8>)>, RemoteError> {
        match self
            .invoke(
                address,
                ChordRequest::GetKeyRange { start, end },
                self.call_timeout,
            )
            .await?
        {
            ChordResponse::Entries(entries) => Ok(entries),
            other => Err(unexpected("GetKeyRange", &other)),
        }
    }
}

fn unexpected(call: &'static str, response: &ChordResponse) -> RemoteError {
    RemoteError::UnexpectedResponse {
        call,
        received: response.kind(),
    }
}
