//! Join, Notify and the three maintenance ticks.
//!
//! Each tick is a single pass that the maintenance tasks call periodically;
//! tests call them directly to drive convergence step by step.

use super::ChordService;
use crate::domain::{ChordError, Key, NotifyOutcome, RemoteNode, StabilizePlan};
use tracing::{debug, error, info, warn};

impl ChordService {
    /// Enter the ring known to `introducer`.
    ///
    /// Adopts `FindSuccessor(own key)` as successor and forgets any
    /// predecessor; Stabilize and Notify fill in the rest.
    pub async fn join(&self, introducer: &str) -> Result<RemoteNode, ChordError> {
        let own_key = self.local().key;
        let successor = self
            .remote
            .find_successor(introducer, own_key)
            .await
            .map_err(|source| ChordError::remote("FindSuccessor", introducer, source))?;

        self.ring.write().join(successor.clone());
        info!(introducer, successor = %successor, "Joined ring");
        Ok(successor)
    }

    /// [`ChordService::join`] retried up to `join_attempts` times, one
    /// stabilize interval apart.
    pub async fn join_with_retry(&self, introducer: &str) -> Result<RemoteNode, ChordError> {
        let attempts = self.config.join_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.join(introducer).await {
                Ok(successor) => return Ok(successor),
                Err(e) if attempt < attempts && e.is_transient() => {
                    warn!(introducer, attempt, attempts, error = %e, "Join attempt failed");
                    attempt += 1;
                    tokio::time::sleep(self.config.stabilize_interval).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// `candidate` believes it is our predecessor.
    ///
    /// On acceptance of a different node, pulls `(own, candidate]` from the
    /// candidate's store as a replica in case it fails.
    pub async fn notify(&self, candidate: RemoteNode) {
        let (outcome, own_key) = {
            let mut ring = self.ring.write();
            (ring.notify(candidate.clone()), ring.local().key)
        };

        match outcome {
            NotifyOutcome::Ignored => {
                debug!(candidate = %candidate, "Ignored predecessor candidate");
            }
            NotifyOutcome::Accepted {
                previous,
                replicate,
            } => {
                if previous.is_some() || replicate {
                    info!(
                        predecessor = %candidate,
                        previous = ?previous.as_ref().map(ToString::to_string),
                        "Accepted new predecessor"
                    );
                }
                if replicate {
                    self.replicate_from(&candidate, own_key).await;
                }
            }
        }
    }

    async fn replicate_from(&self, predecessor: &RemoteNode, own_key: Key) {
        match self
            .remote
            .get_key_range(&predecessor.address, own_key, predecessor.key)
            .await
        {
            Ok(entries) if entries.is_empty() => {}
            Ok(entries) => {
                let merged = self.storage.lock().merge(entries);
                info!(peer = %predecessor, merged, "Replicated range from predecessor");
            }
            Err(e) => {
                warn!(peer = %predecessor, error = %e, "Range replication failed");
            }
        }
    }

    /// One Stabilize pass.
    ///
    /// Learns the successor's predecessor, adopts it if it sits between us
    /// and the successor, and notifies the (possibly new) successor. A dead
    /// successor is replaced by the first distinct backup finger, or self.
    pub async fn stabilize(&self) {
        let plan = self.ring.write().plan_stabilize();

        let successor = match plan {
            StabilizePlan::Local { candidate } => {
                let mut ring = self.ring.write();
                let local = ring.local().clone();
                if ring.adopt_closer_successor(&local, candidate.clone()) {
                    info!(successor = %candidate, "Adopted first successor");
                }
                ring.successor().clone()
            }
            StabilizePlan::Remote { successor } => {
                match self.remote.get_predecessor(&successor.address).await {
                    Ok(candidate) => {
                        let mut ring = self.ring.write();
                        if ring.adopt_closer_successor(&successor, candidate.clone()) {
                            info!(
                                successor = %candidate,
                                previous = %successor,
                                "Adopted closer successor"
                            );
                        }
                        ring.successor().clone()
                    }
                    Err(e) => {
                        let mut ring = self.ring.write();
                        if let Some(replacement) = ring.fail_over(&successor) {
                            warn!(
                                dead = %successor,
                                successor = %replacement,
                                error = %e,
                                "Successor unreachable, failed over"
                            );
                        }
                        ring.successor().clone()
                    }
                }
            }
        };

        let local = self.local();
        if successor == local {
            debug!("Stabilize tick on solo ring");
            return;
        }

        if let Err(e) = self.remote.notify(&successor.address, local).await {
            warn!(peer = %successor, error = %e, "Notify failed");
        }
    }

    /// One FixFingers pass: refresh the finger under the rotating cursor.
    pub async fn fix_fingers(&self) {
        let Some((index, start)) = self.ring.write().next_finger() else {
            return;
        };

        match self.find_successor(start).await {
            Ok(node) => {
                let changed = self.ring.write().set_finger(index, node.clone());
                if changed {
                    info!(finger = index, start = %start, node = %node, "Finger updated");
                } else {
                    debug!(finger = index, start = %start, "Finger unchanged");
                }
            }
            Err(e) if e.is_transient() => {
                warn!(finger = index, start = %start, error = %e, "Finger refresh failed");
            }
            Err(e) => {
                error!(finger = index, start = %start, error = %e, "Finger refresh fault");
            }
        }
    }

    /// One CheckPredecessor pass: forget a predecessor that fails the probe.
    pub async fn check_predecessor(&self) {
        let (predecessor, local) = {
            let ring = self.ring.read();
            (ring.predecessor().cloned(), ring.local().clone())
        };

        let Some(predecessor) = predecessor else {
            return;
        };
        if predecessor == local {
            return;
        }

        let failure = match self.remote.is_alive(&predecessor.address).await {
            Ok(true) => {
                debug!(peer = %predecessor, "Predecessor alive");
                return;
            }
            Ok(false) => "probe not echoed".to_string(),
            Err(e) => e.to_string(),
        };

        let cleared = self.ring.write().clear_predecessor_if(&predecessor);
        if cleared {
            warn!(peer = %predecessor, reason = %failure, "Predecessor unresponsive, cleared");
        }
    }
}
