//! Domain Layer - Pure ring logic with no I/O
//!
//! This module contains the core Chord logic including:
//! - Circular key space and interval predicates
//! - Finger table and closest-preceding-node search
//! - Ring state (successor, predecessor, finger cursor)
//! - Chained-bucket storage engine
//! - Wire protocol messages

pub mod finger_table;
pub mod keyspace;
pub mod protocol;
pub mod ring_state;
pub mod storage;
/// Core domain types (entities, values, errors)
pub mod types;

pub use finger_table::*;
pub use keyspace::*;
pub use protocol::*;
pub use ring_state::*;
pub use storage::*;
pub use types::*;
