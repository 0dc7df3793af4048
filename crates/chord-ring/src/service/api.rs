//! Driving-port implementations for [`ChordService`].

use super::ChordService;
use crate::domain::{
    ChordError, ChordRequest, ChordResponse, Key, KeyLookup, KeySpace, PutOutcome, RemoteNode,
};
use crate::ports::{dispatch, ChordApi, RequestHandler};
use async_trait::async_trait;
use tracing::trace;

#[async_trait]
impl ChordApi for ChordService {
    async fn find_successor(&self, target: Key) -> Result<RemoteNode, ChordError> {
        ChordService::find_successor(self, target).await
    }

    async fn notify(&self, candidate: RemoteNode) {
        ChordService::notify(self, candidate).await
    }

    fn get_predecessor(&self) -> RemoteNode {
        let ring = self.ring.read();
        ring.predecessor().unwrap_or(ring.local()).clone()
    }

    fn is_alive(&self, probe: bool) -> bool {
        probe
    }

    async fn put_key(&self, key: String, value: Vec<u8>) -> PutOutcome {
        ChordService::put_key(self, key, value).await
    }

    fn get_key(&self, key: &str) -> KeyLookup {
        ChordService::get_key(self, key)
    }

    fn put_key_backup(&self, key: String, value: Vec<u8>) {
        ChordService::put_key_backup(self, key, value)
    }

    fn get_key_range(&self, start: Key, end: Key) -> Result<Vec<(String, Vec<u8>)>, ChordError> {
        ChordService::get_key_range(self, start, end)
    }

    fn key_space(&self) -> KeySpace {
        self.space()
    }
}

#[async_trait]
impl RequestHandler for ChordService {
    async fn handle(&self, request: ChordRequest) -> ChordResponse {
        trace!(call = request.name(), "Inbound request");
        dispatch(self, request).await
    }
}
