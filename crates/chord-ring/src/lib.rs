//! # Chord Ring
//!
//! A Chord distributed hash table node: a self-organizing overlay ring that
//! partitions a circular key space of `2^bits` positions and routes lookups
//! in O(log N) hops.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** Pure ring logic (interval math, finger table, ring
//!   state, chained-bucket storage, wire messages)
//! - **Ports Layer:** `ChordApi` / `RequestHandler` on the driving side,
//!   `Transport` on the driven side
//! - **Service Layer:** `ChordService`, the node façade running join,
//!   notify, stabilize, fix-fingers and check-predecessor
//! - **Adapters Layer:** in-memory transport, TCP transport (feature `network`)
//!
//! ## Example
//!
//! ```rust
//! use chord_ring::{KeySpace, Key, RingState, Route};
//!
//! let space = KeySpace::new(8).unwrap();
//! let ring = RingState::new_solo(space, "10.0.0.1:2001");
//!
//! // A solo node owns the whole circle.
//! let owner = ring.route(Key(42)).unwrap();
//! assert_eq!(owner, Route::Resolved(ring.local().clone()));
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod domain;
pub mod ports;
pub mod service;

// =============================================================================
// TRANSPORT ADAPTERS
// =============================================================================

pub mod adapters;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use domain::{
    Bucket, ChordConfig, ChordError, ChordRequest, ChordResponse, Entry, FingerTable, Key,
    KeyLookup, KeySpace, NotifyOutcome, PutOutcome, RemoteError, RemoteNode, RingSnapshot,
    RingState, Route, StabilizePlan, StorageEngine, TransportError, MAX_BITS, MIN_BITS,
};

pub use ports::{dispatch, ChordApi, MockTransport, RequestHandler, Transport};

pub use service::{ChordService, MaintenanceHandles, RemoteCaller};

pub use adapters::{InMemoryNetwork, InMemoryTransport};

#[cfg(feature = "network")]
pub use adapters::{TcpServer, TcpTransport};
