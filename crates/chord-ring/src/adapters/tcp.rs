//! TCP transport.
//!
//! One connection per call. Each request and response is a single frame:
//!
//! ```text
//! +----------------+---------------------------+
//! | length (u32 BE)| bincode(ChordRequest/...) |
//! +----------------+---------------------------+
//! ```
//!
//! The server keeps reading frames on a connection until the peer closes
//! it, answering each in order.

use crate::domain::{ChordRequest, ChordResponse, TransportError};
use crate::ports::{RequestHandler, Transport};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::watch;
use tokio_util::bytes::Bytes;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::{debug, info, warn};

/// Largest accepted frame. Range pulls are the only large payloads.
pub const MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

fn codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_codec()
}

fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, TransportError> {
    bincode::serialize(message).map_err(|e| TransportError::Codec(e.to_string()))
}

fn decode<T: DeserializeOwned>(frame: &[u8]) -> Result<T, TransportError> {
    bincode::deserialize(frame).map_err(|e| TransportError::Codec(e.to_string()))
}

// =============================================================================
// Client
// =============================================================================

/// Connect-per-call TCP [`Transport`].
#[derive(Debug, Clone, Default)]
pub struct TcpTransport;

impl TcpTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn call(
        &self,
        address: &str,
        request: ChordRequest,
        timeout: Duration,
    ) -> Result<ChordResponse, TransportError> {
        tokio::time::timeout(timeout, round_trip(address, request))
            .await
            .map_err(|_| TransportError::Timeout {
                address: address.to_string(),
                timeout,
            })?
    }
}

async fn round_trip(address: &str, request: ChordRequest) -> Result<ChordResponse, TransportError> {
    let unreachable = |e: io::Error| TransportError::Unreachable {
        address: address.to_string(),
        reason: e.to_string(),
    };

    let stream = TcpStream::connect(address).await.map_err(unreachable)?;
    if let Err(e) = stream.set_nodelay(true) {
        debug!(peer = address, error = %e, "Could not disable Nagle");
    }

    let mut framed = Framed::new(stream, codec());
    framed
        .send(Bytes::from(encode(&request)?))
        .await
        .map_err(unreachable)?;

    match framed.next().await {
        Some(Ok(frame)) => decode(&frame),
        Some(Err(e)) => Err(unreachable(e)),
        None => Err(TransportError::Closed {
            address: address.to_string(),
        }),
    }
}

// =============================================================================
// Server
// =============================================================================

/// Accept loop delivering inbound frames to a [`RequestHandler`].
pub struct TcpServer {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpServer {
    pub async fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until `shutdown` flips to `true`. One task per connection.
    pub async fn serve(self, handler: Arc<dyn RequestHandler>, mut shutdown: watch::Receiver<bool>) {
        info!(listen = %self.local_addr, "Chord server listening");

        while !*shutdown.borrow() {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let handler = Arc::clone(&handler);
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(stream, handler).await {
                                debug!(peer = %peer, error = %e, "Connection closed with error");
                            }
                        });
                    }
                    Err(e) => warn!(error = %e, "Accept failed"),
                },
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(listen = %self.local_addr, "Chord server stopped");
    }
}

async fn serve_connection(
    stream: TcpStream,
    handler: Arc<dyn RequestHandler>,
) -> Result<(), TransportError> {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_default();
    let io_error = |e: io::Error| TransportError::Unreachable {
        address: peer.clone(),
        reason: e.to_string(),
    };

    let mut framed = Framed::new(stream, codec());
    while let Some(frame) = framed.next().await {
        let frame = frame.map_err(io_error)?;
        let response = match decode::<ChordRequest>(&frame) {
            Ok(request) => handler.handle(request).await,
            Err(e) => ChordResponse::Fault(e.to_string()),
        };
        framed
            .send(Bytes::from(encode(&response)?))
            .await
            .map_err(io_error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Key, RemoteNode};

    struct Fixed;

    #[async_trait]
    impl RequestHandler for Fixed {
        async fn handle(&self, request: ChordRequest) -> ChordResponse {
            match request {
                ChordRequest::FindSuccessor(key) => {
                    ChordResponse::Node(RemoteNode::new("owner:2001", key))
                }
                ChordRequest::IsAlive(flag) => ChordResponse::Alive(flag),
                _ => ChordResponse::Ack,
            }
        }
    }

    #[tokio::test]
    async fn test_request_round_trip_over_loopback() {
        let server = TcpServer::bind("127.0.0.1:0").await.unwrap();
        let address = server.local_addr().to_string();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(server.serve(Arc::new(Fixed), shutdown_rx));

        let transport = TcpTransport::new();
        let reply = transport
            .call(&address, ChordRequest::FindSuccessor(Key(77)), Duration::from_secs(5))
            .await;
        assert_eq!(
            reply,
            Ok(ChordResponse::Node(RemoteNode::new("owner:2001", Key(77))))
        );

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let reply = TcpTransport::new()
            .call(&address, ChordRequest::IsAlive(true), Duration::from_secs(5))
            .await;
        assert!(matches!(reply, Err(TransportError::Unreachable { .. })));
    }
}
