//! Ring State
//!
//! The mutable aggregate every ring operation works against: successor,
//! predecessor, finger table and the FixFingers cursor. The service keeps it
//! behind a single lock so a reader never observes the successor and
//! `fingers[0]` disagreeing.
//!
//! Everything here is synchronous. Operations that need a remote answer are
//! split into a plan step (read what to call) and an apply step that checks
//! the state it planned against is still current.

use crate::domain::{ChordError, FingerTable, Key, KeySpace, RemoteNode, RingSnapshot};

/// Where a lookup goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The target lies in `(own, successor]`; the successor owns it.
    Resolved(RemoteNode),
    /// Ask this finger to continue the lookup.
    Forward(RemoteNode),
}

/// What Stabilize must do to learn its successor's predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StabilizePlan {
    /// The node is its own successor; the local predecessor is the candidate.
    Local { candidate: RemoteNode },
    /// Ask the successor for its predecessor.
    Remote { successor: RemoteNode },
}

/// Result of applying a Notify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The candidate is not closer than the current predecessor.
    Ignored,
    /// The candidate is the new predecessor.
    Accepted {
        previous: Option<RemoteNode>,
        /// Whether the range held by the new predecessor should be pulled.
        replicate: bool,
    },
}

#[derive(Debug, Clone)]
pub struct RingState {
    space: KeySpace,
    local: RemoteNode,
    successor: RemoteNode,
    predecessor: Option<RemoteNode>,
    fingers: FingerTable,
    next_finger: usize,
}

impl RingState {
    /// Bootstrap a solo ring: successor and every finger point at self.
    pub fn new_solo(space: KeySpace, address: impl Into<String>) -> Self {
        let address = address.into();
        let key = space.hash(&address);
        let local = RemoteNode::new(address, key);
        Self {
            fingers: FingerTable::filled(space.num_fingers(), &local),
            successor: local.clone(),
            predecessor: None,
            local,
            space,
            next_finger: 1,
        }
    }

    pub fn space(&self) -> &KeySpace {
        &self.space
    }

    pub fn local(&self) -> &RemoteNode {
        &self.local
    }

    pub fn successor(&self) -> &RemoteNode {
        &self.successor
    }

    pub fn predecessor(&self) -> Option<&RemoteNode> {
        self.predecessor.as_ref()
    }

    pub fn fingers(&self) -> &FingerTable {
        &self.fingers
    }

    /// Whether `key` lies in `(predecessor, own]`.
    ///
    /// With no known predecessor the node answers for the whole circle.
    pub fn owns(&self, key: Key) -> bool {
        match &self.predecessor {
            Some(predecessor) => {
                self.space
                    .between_end_inclusive(key, predecessor.key, self.local.key)
            }
            None => true,
        }
    }

    // =========================================================================
    // Routing
    // =========================================================================

    pub fn closest_preceding_node(&self, target: Key) -> Result<RemoteNode, ChordError> {
        self.fingers
            .closest_preceding_node(&self.space, &self.local, target)
    }

    /// Decide the next step of `FindSuccessor(target)`.
    pub fn route(&self, target: Key) -> Result<Route, ChordError> {
        if self
            .space
            .between_end_inclusive(target, self.local.key, self.successor.key)
        {
            return Ok(Route::Resolved(self.successor.clone()));
        }

        let next = self.closest_preceding_node(target)?;
        if next == self.local {
            return Err(ChordError::RoutingLoop { target });
        }
        Ok(Route::Forward(next))
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Adopt `node` as successor and `fingers[0]`. Returns `true` on change.
    pub fn set_successor(&mut self, node: RemoteNode) -> bool {
        self.fingers.set(0, node.clone());
        let changed = self.successor != node;
        self.successor = node;
        changed
    }

    /// Adopt the successor found through an introducer.
    pub fn join(&mut self, successor: RemoteNode) {
        self.set_successor(successor);
        self.predecessor = None;
    }

    /// Accept `candidate` as predecessor if none is known or it is closer.
    pub fn notify(&mut self, candidate: RemoteNode) -> NotifyOutcome {
        let accept = match &self.predecessor {
            None => true,
            Some(current) => self
                .space
                .between(candidate.key, current.key, self.local.key),
        };
        if !accept {
            return NotifyOutcome::Ignored;
        }

        let replicate =
            candidate != self.local && self.predecessor.as_ref() != Some(&candidate);
        let previous = self.predecessor.replace(candidate);
        NotifyOutcome::Accepted {
            previous,
            replicate,
        }
    }

    /// First half of Stabilize. Defaults an unknown predecessor to the successor.
    pub fn plan_stabilize(&mut self) -> StabilizePlan {
        let successor = &self.successor;
        let candidate = self
            .predecessor
            .get_or_insert_with(|| successor.clone())
            .clone();

        if self.successor == self.local {
            StabilizePlan::Local { candidate }
        } else {
            StabilizePlan::Remote {
                successor: self.successor.clone(),
            }
        }
    }

    /// Adopt `candidate` if it sits strictly inside `(own, successor)`.
    ///
    /// Only applies while the successor is still `observed`, the node the
    /// candidate was learned from.
    pub fn adopt_closer_successor(&mut self, observed: &RemoteNode, candidate: RemoteNode) -> bool {
        if &self.successor != observed {
            return false;
        }
        if self
            .space
            .between(candidate.key, self.local.key, self.successor.key)
        {
            self.set_successor(candidate)
        } else {
            false
        }
    }

    /// Replace a dead successor with the first distinct backup finger, or self.
    ///
    /// Returns the replacement, or `None` if `dead` is no longer the successor.
    pub fn fail_over(&mut self, dead: &RemoteNode) -> Option<RemoteNode> {
        if &self.successor != dead {
            return None;
        }

        let replacement = self
            .fingers
            .first_backup(dead)
            .cloned()
            .unwrap_or_else(|| self.local.clone());

        self.fingers.replace_all(dead, &replacement);
        self.set_successor(replacement.clone());
        if self.predecessor.as_ref() == Some(dead) {
            self.predecessor = None;
        }
        Some(replacement)
    }

    /// Point fingers at `dead` back at the successor. The successor itself
    /// is left to Stabilize.
    pub fn evict_finger(&mut self, dead: &RemoteNode) -> usize {
        if &self.successor == dead {
            return 0;
        }
        let successor = self.successor.clone();
        self.fingers.replace_all(dead, &successor)
    }

    /// Advance the FixFingers cursor over `[1, NumFingers)`.
    ///
    /// Returns `None` when there is no finger beyond the successor.
    pub fn next_finger(&mut self) -> Option<(usize, Key)> {
        let count = self.fingers.len();
        if count < 2 {
            return None;
        }

        let index = self.next_finger;
        self.next_finger = if index + 1 >= count { 1 } else { index + 1 };
        Some((index, self.space.finger_start(self.local.key, index)))
    }

    /// Write a refreshed finger. Slot 0 belongs to the successor.
    pub fn set_finger(&mut self, index: usize, node: RemoteNode) -> bool {
        if index == 0 {
            return false;
        }
        self.fingers.set(index, node)
    }

    /// Forget the predecessor if it is still `expected`.
    pub fn clear_predecessor_if(&mut self, expected: &RemoteNode) -> bool {
        if self.predecessor.as_ref() == Some(expected) {
            self.predecessor = None;
            true
        } else {
            false
        }
    }

    pub fn snapshot(&self, stored_entries: usize) -> RingSnapshot {
        RingSnapshot {
            local: self.local.clone(),
            successor: self.successor.clone(),
            predecessor: self.predecessor.clone(),
            fingers: self.fingers.entries().to_vec(),
            stored_entries,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_local(space: KeySpace, local: RemoteNode) -> Self {
        Self {
            fingers: FingerTable::filled(space.num_fingers(), &local),
            successor: local.clone(),
            predecessor: None,
            local,
            space,
            next_finger: 1,
        }
    }

    #[cfg(test)]
    pub(crate) fn fingers_mut(&mut self) -> &mut FingerTable {
        &mut self.fingers
    }
}
