use super::ChordService;
use crate::domain::{ChordError, Key, RemoteNode, Route};
use tracing::{debug, error, warn};

impl ChordService {
    /// Resolve the node owning `target`.
    ///
    /// Answers locally when `target` lies in `(own, successor]`, otherwise
    /// forwards to the closest preceding finger and returns its answer.
    /// A failed hop evicts that finger before the error is surfaced.
    pub async fn find_successor(&self, target: Key) -> Result<RemoteNode, ChordError> {
        let route = self.ring.read().route(target);

        let next = match route {
            Ok(Route::Resolved(owner)) => return Ok(owner),
            Ok(Route::Forward(next)) => next,
            Err(fault) => {
                error!(target = %target, error = %fault, "Lookup aborted");
                return Err(fault);
            }
        };

        debug!(target = %target, hop = %next, "Forwarding lookup");
        match self.remote.find_successor(&next.address, target).await {
            Ok(owner) => Ok(owner),
            Err(source) => {
                if source.is_transport() {
                    let evicted = self.ring.write().evict_finger(&next);
                    if evicted > 0 {
                        warn!(peer = %next, evicted, "Evicted unreachable finger");
                    }
                }
                Err(ChordError::remote("FindSuccessor", next.address, source))
            }
        }
    }

    /// Highest finger strictly between this node and `target`, or self.
    pub fn closest_preceding_node(&self, target: Key) -> Result<RemoteNode, ChordError> {
        self.ring.read().closest_preceding_node(target)
    }
}
