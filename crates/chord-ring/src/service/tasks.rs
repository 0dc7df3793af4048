//! Supervised maintenance loops.
//!
//! Stabilize, FixFingers and CheckPredecessor each run in their own tokio
//! task on a fixed interval until the shutdown flag flips to `true`.

use super::ChordService;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

/// Join handles of the three maintenance loops.
pub struct MaintenanceHandles {
    pub stabilize: JoinHandle<()>,
    pub fix_fingers: JoinHandle<()>,
    pub check_predecessor: JoinHandle<()>,
}

impl MaintenanceHandles {
    /// Wait for all loops to exit.
    pub async fn join(self) {
        let (stabilize, fix_fingers, check_predecessor) =
            tokio::join!(self.stabilize, self.fix_fingers, self.check_predecessor);
        for (task, result) in [
            ("stabilize", stabilize),
            ("fix_fingers", fix_fingers),
            ("check_predecessor", check_predecessor),
        ] {
            if let Err(e) = result {
                error!(task, error = %e, "Maintenance task ended abnormally");
            }
        }
    }

    /// Abort all loops without waiting for the current tick.
    pub fn abort(&self) {
        self.stabilize.abort();
        self.fix_fingers.abort();
        self.check_predecessor.abort();
    }
}

impl ChordService {
    /// Start the three maintenance loops.
    ///
    /// Sending `true` on the paired `watch::Sender` stops them after the
    /// tick in progress.
    pub fn spawn_maintenance(self: &Arc<Self>, shutdown: watch::Receiver<bool>) -> MaintenanceHandles {
        let stabilize = {
            let node = Arc::clone(self);
            spawn_loop("stabilize", self.config.stabilize_interval, shutdown.clone(), move || {
                let node = Arc::clone(&node);
                async move { node.stabilize().await }
            })
        };

        let fix_fingers = {
            let node = Arc::clone(self);
            spawn_loop("fix_fingers", self.config.fix_fingers_interval, shutdown.clone(), move || {
                let node = Arc::clone(&node);
                async move { node.fix_fingers().await }
            })
        };

        let check_predecessor = {
            let node = Arc::clone(self);
            spawn_loop(
                "check_predecessor",
                self.config.check_predecessor_interval,
                shutdown,
                move || {
                    let node = Arc::clone(&node);
                    async move { node.check_predecessor().await }
                },
            )
        };

        MaintenanceHandles {
            stabilize,
            fix_fingers,
            check_predecessor,
        }
    }
}

fn spawn_loop<F, Fut>(
    task: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(task, period = ?period, "Maintenance loop started");

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => tick().await,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        debug!(task, "Maintenance loop stopped");
    })
}
