//! Process-level wiring of one Chord node.

use crate::config::NodeConfig;
use crate::net;
use anyhow::{Context, Result};
use chord_ring::{
    ChordService, MaintenanceHandles, RequestHandler, RingSnapshot, TcpServer, TcpTransport,
    Transport,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// How often the runtime logs a one-line ring summary.
pub const STATUS_INTERVAL: Duration = Duration::from_secs(30);

/// A running node: TCP server, maintenance loops and status reporter.
pub struct NodeRuntime {
    service: Arc<ChordService>,
    listen: SocketAddr,
    server: JoinHandle<()>,
    maintenance: MaintenanceHandles,
    status: JoinHandle<()>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
}

impl NodeRuntime {
    /// Bind, create or join the ring, and start the maintenance loops.
    ///
    /// ## Startup Sequence
    ///
    /// 1. Bind the TCP server (the advertised address depends on the bound port)
    /// 2. Create the node as a solo ring
    /// 3. Start serving inbound calls
    /// 4. Join through the introducer, if any
    /// 5. Spawn Stabilize, FixFingers and CheckPredecessor
    pub async fn start(config: NodeConfig) -> Result<Self> {
        config.validate().context("Invalid node configuration")?;

        let server = TcpServer::bind(config.listen)
            .await
            .with_context(|| format!("Failed to bind {}", config.listen))?;
        let listen = server.local_addr();
        let address = net::advertised_address(config.advertise.as_deref(), listen);

        let transport: Arc<dyn Transport> = Arc::new(TcpTransport::new());
        let service = Arc::new(
            ChordService::new(config.chord.clone(), address, transport)
                .context("Failed to create ring state")?,
        );
        let local = service.local();

        info!("===========================================");
        info!("  Chord Node v{}", env!("CARGO_PKG_VERSION"));
        info!("  Address: {}", local.address);
        info!("  Key:     {} / {}", local.key, service.space().max_key());
        info!("  Listen:  {}", listen);
        info!("===========================================");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handler: Arc<dyn RequestHandler> = service.clone();
        let server = tokio::spawn(server.serve(handler, shutdown_rx.clone()));

        match &config.introducer {
            Some(introducer) => {
                info!(introducer = %introducer, "Joining existing ring");
                if let Err(e) = service.join_with_retry(introducer).await {
                    let _ = shutdown_tx.send(true);
                    let _ = server.await;
                    return Err(e).with_context(|| format!("Failed to join via {introducer}"));
                }
            }
            None => info!("Creating new ring"),
        }

        let maintenance = service.spawn_maintenance(shutdown_rx.clone());
        let status = spawn_status_reporter(Arc::clone(&service), shutdown_rx);

        info!("Node is running");
        Ok(Self {
            service,
            listen,
            server,
            maintenance,
            status,
            shutdown_tx,
        })
    }

    pub fn service(&self) -> Arc<ChordService> {
        Arc::clone(&self.service)
    }

    /// Address the TCP server is bound to.
    pub fn listen_addr(&self) -> SocketAddr {
        self.listen
    }

    pub fn snapshot(&self) -> RingSnapshot {
        self.service.snapshot()
    }

    /// Stop serving and wait for every task to exit.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        self.maintenance.join().await;
        for (task, handle) in [("server", self.server), ("status", self.status)] {
            if let Err(e) = handle.await {
                error!(task, error = %e, "Task ended abnormally");
            }
        }

        info!("Shutdown complete");
    }
}

fn spawn_status_reporter(
    service: Arc<ChordService>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATUS_INTERVAL);
        interval.tick().await;

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => {
                    let snapshot = service.snapshot();
                    info!(
                        successor = %snapshot.successor,
                        predecessor = ?snapshot.predecessor.as_ref().map(ToString::to_string),
                        stored = snapshot.stored_entries,
                        "Ring status"
                    );
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
    })
}
