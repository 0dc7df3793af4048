//! # Service Layer - Node Façade
//!
//! [`ChordService`] owns the ring state and the storage engine of one node,
//! serves inbound calls and runs the maintenance protocol.
//!
//! ## Locking
//!
//! - `ring`: successor, predecessor and fingers behind one `RwLock`.
//! - `storage`: the storage engine behind a `Mutex`.
//!
//! If both are needed, `ring` is taken first. No guard is held across an
//! `.await`: remote targets are read, the guard dropped, then the call made.
//! Results are applied afterwards only if the state they were planned
//! against is unchanged.

mod api;
mod core;
mod membership;
mod remote;
mod routing;
mod storage;
mod tasks;

pub use self::core::ChordService;
pub use remote::RemoteCaller;
pub use tasks::MaintenanceHandles;
