//! # Adapters Layer - Concrete Transports
//!
//! - `memory`: in-process network of nodes, used by tests and simulations.
//! - `tcp`: length-delimited bincode frames over TCP (feature `network`).

pub mod memory;

#[cfg(feature = "network")]
pub mod tcp;

pub use memory::{InMemoryNetwork, InMemoryTransport};

#[cfg(feature = "network")]
pub use tcp::{TcpServer, TcpTransport};
