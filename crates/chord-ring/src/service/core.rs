use super::RemoteCaller;
use crate::domain::{
    ChordConfig, ChordError, KeySpace, RemoteNode, RingSnapshot, RingState, StorageEngine,
};
use crate::ports::Transport;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::info;

/// A single Chord node.
///
/// Created as a solo ring: its own successor, every finger pointing at
/// itself and no known predecessor. Call [`ChordService::join`] to enter an
/// existing ring and [`ChordService::spawn_maintenance`] to start converging.
///
/// # Example
///
/// ```rust,ignore
/// let network = InMemoryNetwork::new();
/// let node = Arc::new(ChordService::new(
///     ChordConfig::for_testing(),
///     "10.0.0.1:2001",
///     network.transport(),
/// )?);
/// network.register(node.local().address, node.clone());
/// node.join("10.0.0.2:2001").await?;
/// ```
pub struct ChordService {
    /// Successor, predecessor, fingers and FixFingers cursor
    pub(crate) ring: RwLock<RingState>,
    /// Entries this node owns or backs up
    pub(crate) storage: Mutex<StorageEngine>,
    /// Typed calls to peers
    pub(crate) remote: RemoteCaller,
    pub(crate) config: ChordConfig,
}

impl ChordService {
    /// Bootstrap a solo ring at `address`.
    ///
    /// Fails only when the configured key space is invalid.
    pub fn new(
        config: ChordConfig,
        address: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ChordError> {
        let space = config.key_space()?;
        let ring = RingState::new_solo(space, address);

        info!(
            node = %ring.local(),
            bits = space.bits(),
            fingers = space.num_fingers(),
            "Bootstrapped solo ring"
        );

        Ok(Self {
            ring: RwLock::new(ring),
            storage: Mutex::new(StorageEngine::new(space)),
            remote: RemoteCaller::new(transport, config.call_timeout, config.liveness_timeout),
            config,
        })
    }

    pub fn config(&self) -> &ChordConfig {
        &self.config
    }

    pub fn space(&self) -> KeySpace {
        *self.ring.read().space()
    }

    pub fn local(&self) -> RemoteNode {
        self.ring.read().local().clone()
    }

    pub fn successor(&self) -> RemoteNode {
        self.ring.read().successor().clone()
    }

    pub fn predecessor(&self) -> Option<RemoteNode> {
        self.ring.read().predecessor().cloned()
    }

    /// Caller sharing this node's transport and deadlines.
    pub fn remote(&self) -> &RemoteCaller {
        &self.remote
    }

    /// Consistent view of ring state plus the stored entry count.
    pub fn snapshot(&self) -> RingSnapshot {
        let ring = self.ring.read();
        let stored = self.storage.lock().len();
        ring.snapshot(stored)
    }
}
