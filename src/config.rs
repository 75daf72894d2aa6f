//! Runtime configuration, read from the environment.
//!
//! | Variable               | Default   |
//! |------------------------|-----------|
//! | `ALERTDECK_BIND`       | `0.0.0.0` |
//! | `ALERTDECK_PORT`       | `3000`    |
//! | `ALERTDECK_LATENCY_MS` | `0`       |
//! | `ALERTDECK_SEED_DEMO`  | `true`    |
//!
//! Values that fail to parse are logged and replaced by the default.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Default port if not specified via environment variable.
const DEFAULT_PORT: u16 = 3000;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: IpAddr,
    pub port: u16,
    /// Artificial delay before the store answers a read.
    pub latency: Duration,
    /// Load the demo alerts at startup.
    pub seed_demo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            latency: Duration::ZERO,
            seed_demo: true,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            bind: parse_or(&lookup, "ALERTDECK_BIND", defaults.bind),
            port: parse_or(&lookup, "ALERTDECK_PORT", defaults.port),
            latency: Duration::from_millis(parse_or(&lookup, "ALERTDECK_LATENCY_MS", 0u64)),
            seed_demo: parse_or(&lookup, "ALERTDECK_SEED_DEMO", defaults.seed_demo),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Ignoring unparsable configuration value");
            default
        }),
        None => default,
    }
}
