//! In-process transport.
//!
//! Nodes register their [`RequestHandler`] under an address; calls are
//! delivered as direct async invocations. A node can be taken down to
//! simulate a crash: calls to it fail as unreachable until it is brought
//! back up. Handlers are held weakly, so dropping a node also takes it off
//! the network.

use crate::domain::{ChordRequest, ChordResponse, TransportError};
use crate::ports::{RequestHandler, Transport};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

#[derive(Default)]
struct NetworkState {
    handlers: HashMap<String, Weak<dyn RequestHandler>>,
    down: HashSet<String>,
}

/// Registry of in-process nodes.
#[derive(Clone, Default)]
pub struct InMemoryNetwork {
    state: Arc<RwLock<NetworkState>>,
    delivered: Arc<AtomicU64>,
}

impl InMemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport handle for a node living on this network.
    pub fn transport(&self) -> Arc<InMemoryTransport> {
        Arc::new(InMemoryTransport {
            network: self.clone(),
        })
    }

    pub fn register(&self, address: impl Into<String>, handler: Arc<dyn RequestHandler>) {
        self.state
            .write()
            .handlers
            .insert(address.into(), Arc::downgrade(&handler));
    }

    pub fn deregister(&self, address: &str) {
        let mut state = self.state.write();
        state.handlers.remove(address);
        state.down.remove(address);
    }

    /// Stop `address` from answering.
    pub fn take_down(&self, address: &str) {
        self.state.write().down.insert(address.to_string());
    }

    pub fn bring_up(&self, address: &str) {
        self.state.write().down.remove(address);
    }

    pub fn is_up(&self, address: &str) -> bool {
        let state = self.state.read();
        !state.down.contains(address)
            && state
                .handlers
                .get(address)
                .is_some_and(|handler| handler.strong_count() > 0)
    }

    /// Number of requests delivered to a handler so far.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    fn resolve(&self, address: &str) -> Result<Arc<dyn RequestHandler>, TransportError> {
        let state = self.state.read();
        let unreachable = |reason: &str| TransportError::Unreachable {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        if state.down.contains(address) {
            return Err(unreachable("node is down"));
        }
        state
            .handlers
            .get(address)
            .and_then(Weak::upgrade)
            .ok_or_else(|| unreachable("no node registered"))
    }
}

/// [`Transport`] that delivers to handlers on an [`InMemoryNetwork`].
pub struct InMemoryTransport {
    network: InMemoryNetwork,
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn call(
        &self,
        address: &str,
        request: ChordRequest,
        timeout: Duration,
    ) -> Result<ChordResponse, TransportError> {
        let handler = self.network.resolve(address)?;
        self.network.delivered.fetch_add(1, Ordering::Relaxed);

        tokio::time::timeout(timeout, handler.handle(request))
            .await
            .map_err(|_| TransportError::Timeout {
                address: address.to_string(),
                timeout,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Key;

    struct Echo;

    #[async_trait]
    impl RequestHandler for Echo {
        async fn handle(&self, request: ChordRequest) -> ChordResponse {
            match request {
                ChordRequest::IsAlive(flag) => ChordResponse::Alive(flag),
                _ => ChordResponse::Ack,
            }
        }
    }

    struct Stalled;

    #[async_trait]
    impl RequestHandler for Stalled {
        async fn handle(&self, _request: ChordRequest) -> ChordResponse {
            tokio::time::sleep(Duration::from_secs(60)).await;
            ChordResponse::Ack
        }
    }

    const TIMEOUT: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn test_delivers_to_registered_handler() {
        let network = InMemoryNetwork::new();
        let echo: Arc<dyn RequestHandler> = Arc::new(Echo);
        network.register("a:2001", echo.clone());

        let reply = network
            .transport()
            .call("a:2001", ChordRequest::IsAlive(true), TIMEOUT)
            .await;
        assert_eq!(reply, Ok(ChordResponse::Alive(true)));
        assert_eq!(network.delivered(), 1);
        assert!(network.is_up("a:2001"));
    }

    #[tokio::test]
    async fn test_down_and_unknown_nodes_are_unreachable() {
        let network = InMemoryNetwork::new();
        let echo: Arc<dyn RequestHandler> = Arc::new(Echo);
        network.register("a:2001", echo.clone());
        network.take_down("a:2001");

        let transport = network.transport();
        let down = transport
            .call("a:2001", ChordRequest::GetPredecessor, TIMEOUT)
            .await;
        let unknown = transport
            .call("b:2001", ChordRequest::GetPredecessor, TIMEOUT)
            .await;
        assert!(matches!(down, Err(TransportError::Unreachable { .. })));
        assert!(matches!(unknown, Err(TransportError::Unreachable { .. })));

        network.bring_up("a:2001");
        assert!(transport
            .call("a:2001", ChordRequest::FindSuccessor(Key(1)), TIMEOUT)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_dropped_handler_is_unreachable() {
        let network = InMemoryNetwork::new();
        let echo: Arc<dyn RequestHandler> = Arc::new(Echo);
        network.register("a:2001", echo.clone());
        drop(echo);

        assert!(!network.is_up("a:2001"));
        let reply = network
            .transport()
            .call("a:2001", ChordRequest::IsAlive(true), TIMEOUT)
            .await;
        assert!(matches!(reply, Err(TransportError::Unreachable { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_handler_times_out() {
        let network = InMemoryNetwork::new();
        let stalled: Arc<dyn RequestHandler> = Arc::new(Stalled);
        network.register("slow:2001", stalled.clone());

        let reply = network
            .transport()
            .call("slow:2001", ChordRequest::IsAlive(true), TIMEOUT)
            .await;
        assert_eq!(
            reply,
            Err(TransportError::Timeout {
                address: "slow:2001".into(),
                timeout: TIMEOUT
            })
        );
    }
}
