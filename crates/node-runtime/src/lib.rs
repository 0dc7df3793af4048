//! # Node Runtime Library
//!
//! Process bootstrap for a Chord node: layered configuration, outbound
//! address discovery, the runtime that owns the TCP server and maintenance
//! loops, and a small client. The `chord-node` binary in `main.rs` is a thin
//! CLI over these modules.

pub mod client;
pub mod config;
pub mod net;
pub mod runtime;

pub use client::{ClientError, RingClient};
pub use config::{ConfigError, NodeConfig, Overrides};
pub use runtime::NodeRuntime;
