//! # Node Configuration
//!
//! Resolved in layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config`)
//! 3. Environment (`CHORD_BITS`, `CHORD_PORT`, `CHORD_INTRODUCER`, `CHORD_ADVERTISE`)
//! 4. Command-line flags
//!
//! ```toml
//! [node]
//! listen = "0.0.0.0:2001"
//! advertise = "10.0.0.5:2001"
//! introducer = "10.0.0.1:2001"
//!
//! [ring]
//! bits = 10
//! stabilize_interval_ms = 1000
//! call_timeout_ms = 10000
//! ```

use chord_ring::{ChordConfig, MAX_BITS, MIN_BITS};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Port the node listens on when none is configured.
pub const DEFAULT_PORT: u16 = 2001;

/// Environment variable names.
pub const ENV_BITS: &str = "CHORD_BITS";
pub const ENV_PORT: &str = "CHORD_PORT";
pub const ENV_INTRODUCER: &str = "CHORD_INTRODUCER";
pub const ENV_ADVERTISE: &str = "CHORD_ADVERTISE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Ring parameters handed to the core.
    pub chord: ChordConfig,
    /// Address the TCP server binds.
    pub listen: SocketAddr,
    /// Address peers use to reach this node. Discovered when unset.
    pub advertise: Option<String>,
    /// Existing ring member to join through. `None` creates a new ring.
    pub introducer: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            chord: ChordConfig::default(),
            listen: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            advertise: None,
            introducer: None,
        }
    }
}

/// Values given on the command line. `None` leaves the lower layer in place.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bits: Option<u32>,
    pub listen: Option<SocketAddr>,
    pub port: Option<u16>,
    pub advertise: Option<String>,
    pub introducer: Option<String>,
}

impl NodeConfig {
    /// Whether this node creates a new ring rather than joining one.
    pub fn is_creator(&self) -> bool {
        self.introducer.is_none()
    }

    /// Defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse a TOML document over the defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut config = Self::default();
        if let Some(listen) = file.node.listen {
            config.listen = parse_socket_addr("node.listen", &listen)?;
        }
        config.advertise = file.node.advertise;
        config.introducer = file.node.introducer;

        let ring = file.ring;
        let chord = &mut config.chord;
        if let Some(bits) = ring.bits {
            chord.bits = bits;
        }
        if let Some(ms) = ring.stabilize_interval_ms {
            chord.stabilize_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = ring.fix_fingers_interval_ms {
            chord.fix_fingers_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = ring.check_predecessor_interval_ms {
            chord.check_predecessor_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = ring.call_timeout_ms {
            chord.call_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = ring.liveness_timeout_ms {
            chord.liveness_timeout = Duration::from_millis(ms);
        }
        if let Some(attempts) = ring.join_attempts {
            chord.join_attempts = attempts;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bits) = lookup(ENV_BITS) {
            self.chord.bits = parse_number(ENV_BITS, &bits)?;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.listen.set_port(parse_number(ENV_PORT, &port)?);
        }
        if let Some(introducer) = lookup(ENV_INTRODUCER).filter(|v| !v.is_empty()) {
            self.introducer = Some(introducer);
        }
        if let Some(advertise) = lookup(ENV_ADVERTISE).filter(|v| !v.is_empty()) {
            self.advertise = Some(advertise);
        }
        self.validate()
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if let Some(bits) = overrides.bits {
            self.chord.bits = bits;
        }
        if let Some(listen) = overrides.listen {
            self.listen = listen;
        }
        if let Some(port) = overrides.port {
            self.listen.set_port(port);
        }
        if overrides.advertise.is_some() {
            self.advertise = overrides.advertise;
        }
        if overrides.introducer.is_some() {
            self.introducer = overrides.introducer;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BITS..=MAX_BITS).contains(&self.chord.bits) {
            return Err(ConfigError::InvalidValue {
                field: "bits",
                value: format!("{} (must be {MIN_BITS}..={MAX_BITS})", self.chord.bits),
            });
        }

        let timers = [
            ("stabilize_interval", self.chord.stabilize_interval),
            ("fix_fingers_interval", self.chord.fix_fingers_interval),
            ("check_predecessor_interval", self.chord.check_predecessor_interval),
            ("call_timeout", self.chord.call_timeout),
            ("liveness_timeout", self.chord.liveness_timeout),
        ];
        for (field, value) in timers {
            if value.is_zero() {
                return Err(ConfigError::InvalidValue {
                    field,
                    value: "0ms".to_string(),
                });
            }
        }

        if let Some(introducer) = &self.introducer {
            if !introducer.contains(':') {
                return Err(ConfigError::InvalidValue {
                    field: "introducer",
                    value: introducer.clone(),
                });
            }
        }
        Ok(())
    }
}

fn parse_socket_addr(field: &'static str, value: &str) -> Result<SocketAddr, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

// =============================================================================
// TOML file layout
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    node: NodeSection,
    #[serde(default)]
    ring: RingSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeSection {
    listen: Option<String>,
    advertise: Option<String>,
    introducer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RingSection {
    bits: Option<u32>,
    stabilize_interval_ms: Option<u64>,
    fix_fingers_interval_ms: Option<u64>,
    check_predecessor_interval_ms: Option<u64>,
    call_timeout_ms: Option<u64>,
    liveness_timeout_ms: Option<u64>,
    join_attempts: Option<u32>,
}
