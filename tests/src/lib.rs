//! # Chord Ring Test Suite
//!
//! Multi-node rings running in one process over the in-memory transport.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # TestRing: build, tick, kill, expected owners
//! └── integration/      # Cross-node behaviour
//!     ├── ring_formation.rs
//!     ├── lookup.rs
//!     ├── churn.rs
//!     └── replication.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p chord-tests
//! cargo test -p chord-tests integration::churn::
//! ```
//!
//! Maintenance is driven one tick at a time, so every run is deterministic.

pub mod harness;
pub mod integration;
