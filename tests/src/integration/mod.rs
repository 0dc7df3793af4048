//! Cross-node scenarios driven through [`crate::harness::TestRing`].

pub mod churn;
pub mod lookup;
pub mod replication;
pub mod ring_formation;
