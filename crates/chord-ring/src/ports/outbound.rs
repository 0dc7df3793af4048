//! # Outbound Ports (Driven Side)
//!
//! The node reaches peers through a single request/response call. Framing,
//! connections and deadlines belong to the adapter.

use crate::domain::{ChordRequest, ChordResponse};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

pub use crate::domain::TransportError;

/// Request/response transport to other nodes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` to `address` and wait at most `timeout` for the reply.
    async fn call(
        &self,
        address: &str,
        request: ChordRequest,
        timeout: Duration,
    ) -> Result<ChordResponse, TransportError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

type Responder =
    dyn Fn(&str, &ChordRequest) -> Result<ChordResponse, TransportError> + Send + Sync;

/// Transport answering from a closure and recording every call.
pub struct MockTransport {
    responder: Box<Responder>,
    calls: Mutex<Vec<(String, ChordRequest)>>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &ChordRequest) -> Result<ChordResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Transport for which every peer is unreachable.
    pub fn unreachable() -> Self {
        Self::new(|address, _| {
            Err(TransportError::Unreachable {
                address: address.to_string(),
                reason: "mock network is down".to_string(),
            })
        })
    }

    /// Calls made so far, oldest first.
    pub fn calls(&self) -> Vec<(String, ChordRequest)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(
        &self,
        address: &str,
        request: ChordRequest,
        _timeout: Duration,
    ) -> Result<ChordResponse, TransportError> {
        let response = (self.responder)(address, &request);
        self.calls.lock().push((address.to_string(), request));
        response
    }
}
