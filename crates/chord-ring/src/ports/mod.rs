//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driving Ports (Inbound):** the ring operations a node serves, and the
//!   single entry point transports deliver requests to.
//! - **Driven Ports (Outbound):** the request/response transport the node
//!   calls peers through.

pub mod inbound;
pub mod outbound;

pub use inbound::{dispatch, ChordApi, RequestHandler};
pub use outbound::{MockTransport, Transport, TransportError};
