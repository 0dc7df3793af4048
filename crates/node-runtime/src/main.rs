//! # Chord Node
//!
//! ```text
//! chord-node run [--config node.toml] [--bits 10] [--port 2001] [--introducer host:port]
//! chord-node lookup --via host:port <key>
//! chord-node put    --via host:port <key> <value>
//! chord-node get    --via host:port <key>
//! ```
//!
//! `run` without an introducer creates a new ring; with one it joins.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use chord_ring::{ChordConfig, TcpTransport};
use node_runtime::{NodeConfig, NodeRuntime, Overrides, RingClient};

#[derive(Parser, Debug)]
#[command(name = "chord-node")]
#[command(author, version, about = "Chord distributed hash table node", long_about = None)]
struct Cli {
    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a node until Ctrl+C
    Run(RunArgs),
    /// Print the node responsible for a key
    Lookup {
        #[command(flatten)]
        target: ClientArgs,
        key: String,
    },
    /// Store a value under a key
    Put {
        #[command(flatten)]
        target: ClientArgs,
        key: String,
        value: String,
    },
    /// Fetch the value stored under a key
    Get {
        #[command(flatten)]
        target: ClientArgs,
        key: String,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Key-space size in bits (1-63)
    #[arg(long)]
    bits: Option<u32>,

    /// Address to bind
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Port to bind (keeps the configured IP)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address advertised to peers
    #[arg(long)]
    advertise: Option<String>,

    /// Ring member to join through; omit to create a new ring
    #[arg(short, long)]
    introducer: Option<String>,
}

#[derive(Args, Debug)]
struct ClientArgs {
    /// Any ring member
    #[arg(long)]
    via: String,

    /// Key-space size of the ring, in bits
    #[arg(long, default_value_t = ChordConfig::default().bits)]
    bits: u32,
}

impl ClientArgs {
    fn client(&self) -> Result<RingClient> {
        let config = ChordConfig::default().with_bits(self.bits);
        RingClient::new(Arc::new(TcpTransport::new()), &config).context("Invalid client settings")
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log filter")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run(args: RunArgs) -> Result<()> {
    let mut config = NodeConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    config
        .apply_overrides(Overrides {
            bits: args.bits,
            listen: args.listen,
            port: args.port,
            advertise: args.advertise,
            introducer: args.introducer,
        })
        .context("Invalid command-line override")?;

    let runtime = NodeRuntime::start(config).await?;

    info!("Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Lookup { target, key } => {
            let client = target.client()?;
            let owner = client.lookup(&target.via, &key).await?;
            println!("{} (key {})", owner, client.key_of(&key));
            Ok(())
        }
        Command::Put { target, key, value } => {
            let owner = target
                .client()?
                .put(&target.via, &key, value.into_bytes())
                .await?;
            println!("stored on {owner}");
            Ok(())
        }
        Command::Get { target, key } => {
            match target.client()?.get(&target.via, &key).await? {
                Some(value) => println!("{}", String::from_utf8_lossy(&value)),
                None => println!("(not found)"),
            }
            Ok(())
        }
    }
}
