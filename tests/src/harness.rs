//! Deterministic multi-node ring.

use chord_ring::{ChordConfig, ChordService, InMemoryNetwork, Key, KeySpace, RemoteNode};
use std::collections::HashSet;
use std::sync::Arc;

/// Rounds run after each join before the next node arrives.
pub const ROUNDS_PER_JOIN: usize = 2;

/// A ring of [`ChordService`] nodes sharing one [`InMemoryNetwork`].
pub struct TestRing {
    pub network: InMemoryNetwork,
    config: ChordConfig,
    space: KeySpace,
    nodes: Vec<Arc<ChordService>>,
}

impl TestRing {
    pub fn new(config: ChordConfig) -> Self {
        let space = config.key_space().expect("test key space");
        Self {
            network: InMemoryNetwork::new(),
            config,
            space,
            nodes: Vec::new(),
        }
    }

    /// `count` nodes: the first creates the ring, the rest join through it
    /// one by one with a few maintenance rounds in between.
    pub async fn build(count: usize) -> Self {
        let mut ring = Self::new(ChordConfig::for_testing());
        while ring.nodes.len() < count {
            let node = ring.add_fresh_node("node");
            if ring.nodes.len() > 1 {
                let introducer = ring.nodes[0].local().address;
                node.join(&introducer).await.expect("join");
                ring.settle(ROUNDS_PER_JOIN).await;
            }
        }
        ring
    }

    pub fn space(&self) -> KeySpace {
        self.space
    }

    fn collides(&self, address: &str) -> bool {
        let key = self.space.hash(address);
        self.nodes.iter().any(|n| n.local().key == key)
    }

    /// Create and register a solo node.
    pub fn add_node(&mut self, address: &str) -> Arc<ChordService> {
        assert!(!self.collides(address), "{address} collides with a ring member");
        let node = Arc::new(
            ChordService::new(self.config.clone(), address, self.network.transport())
                .expect("node"),
        );
        self.network.register(address, node.clone());
        self.nodes.push(Arc::clone(&node));
        node
    }

    /// Register a node named `{prefix}-{n}` for the first `n` whose key is
    /// not taken.
    pub fn add_fresh_node(&mut self, prefix: &str) -> Arc<ChordService> {
        let address = (0..)
            .map(|n| format!("{prefix}-{n}:2001"))
            .find(|address| !self.collides(address) && !self.is_registered(address))
            .expect("unbounded candidates");
        self.add_node(&address)
    }

    fn is_registered(&self, address: &str) -> bool {
        self.nodes.iter().any(|n| n.local().address == address)
    }

    pub fn node(&self, index: usize) -> Arc<ChordService> {
        Arc::clone(&self.nodes[index])
    }

    /// The service behind `handle`.
    pub fn service(&self, handle: &RemoteNode) -> Arc<ChordService> {
        self.nodes
            .iter()
            .find(|n| n.local() == *handle)
            .cloned()
            .unwrap_or_else(|| panic!("{handle} is not part of this ring"))
    }

    /// Resolve `key` through `entry` and return the owning service.
    pub async fn route(&self, entry: &ChordService, key: &str) -> Arc<ChordService> {
        let owner = entry
            .find_successor(self.space.hash(key))
            .await
            .expect("lookup");
        self.service(&owner)
    }

    /// Nodes still answering, in creation order.
    pub fn live(&self) -> Vec<Arc<ChordService>> {
        self.nodes
            .iter()
            .filter(|n| self.network.is_up(&n.local().address))
            .cloned()
            .collect()
    }

    /// Stop `node` from answering. Its state is left untouched.
    pub fn kill(&self, node: &ChordService) {
        self.network.take_down(&node.local().address);
    }

    /// One Stabilize, FixFingers and CheckPredecessor pass on every live node.
    pub async fn tick(&self) {
        for node in self.live() {
            node.stabilize().await;
            node.fix_fingers().await;
            node.check_predecessor().await;
        }
    }

    pub async fn settle(&self, rounds: usize) {
        for _ in 0..rounds {
            self.tick().await;
        }
    }

    /// Tick until `done` holds. Returns whether it did within `max_rounds`.
    pub async fn settle_until<F>(&self, max_rounds: usize, done: F) -> bool
    where
        F: Fn(&Self) -> bool,
    {
        for _ in 0..max_rounds {
            if done(self) {
                return true;
            }
            self.tick().await;
        }
        done(self)
    }

    /// Live node handles sorted by key.
    pub fn ring_order(&self) -> Vec<RemoteNode> {
        let mut members: Vec<_> = self.live().iter().map(|n| n.local()).collect();
        members.sort_by_key(|n| n.key);
        members
    }

    /// The live node whose `(predecessor, key]` range contains `key`.
    pub fn expected_owner(&self, key: Key) -> RemoteNode {
        let order = self.ring_order();
        order
            .iter()
            .find(|n| n.key >= key)
            .or_else(|| order.first())
            .cloned()
            .expect("ring has live nodes")
    }

    /// Every live node's successor and predecessor are its live ring neighbours.
    pub fn is_converged(&self) -> bool {
        let order = self.ring_order();
        let n = order.len();
        self.live().iter().all(|node| {
            let local = node.local();
            let Some(pos) = order.iter().position(|m| *m == local) else {
                return false;
            };
            let successor = &order[(pos + 1) % n];
            let predecessor = &order[(pos + n - 1) % n];
            node.successor() == *successor && node.predecessor().as_ref() == Some(predecessor)
        })
    }

    /// Every finger of every live node is the true owner of its start.
    pub fn fingers_correct(&self) -> bool {
        self.live().iter().all(|node| {
            let snapshot = node.snapshot();
            snapshot.fingers.iter().enumerate().all(|(i, finger)| {
                let start = self.space.finger_start(snapshot.local.key, i);
                finger.as_ref() == Some(&self.expected_owner(start))
            })
        })
    }

    /// No live node routes through a node that stopped answering.
    pub fn references_only_live_nodes(&self) -> bool {
        let live: HashSet<_> = self.ring_order().into_iter().collect();
        self.live().iter().all(|node| {
            let snapshot = node.snapshot();
            live.contains(&snapshot.successor)
                && snapshot.predecessor.as_ref().map_or(true, |p| live.contains(p))
                && snapshot.fingers.iter().flatten().all(|f| live.contains(f))
        })
    }
}
