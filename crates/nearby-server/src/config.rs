//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use nearby_core::ProximityConfig;
use serde::Serialize;

use crate::error::{Error, Result};

/// Port used when neither `NEARBY_ADDR` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 3000;

/// Who receives a fresh nearby list after a participant moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushMode {
    /// Only the participant that sent the event
    #[default]
    Origin,
    /// The sender plus everyone now within its radius
    Neighbors,
}

impl FromStr for PushMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "origin" => Ok(Self::Origin),
            "neighbors" | "neighbours" => Ok(Self::Neighbors),
            other => Err(Error::Config(format!(
                "Invalid NEARBY_PUSH_MODE: {other} (expected origin or neighbors)"
            ))),
        }
    }
}

/// Configuration for a Nearby server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP + WebSocket listen address
    pub listen_addr: SocketAddr,

    /// Directory served for non-API paths
    pub static_dir: PathBuf,

    /// Radius and staleness used for every nearby list
    pub proximity: ProximityConfig,

    /// Push fan-out after a location event
    pub push_mode: PushMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            static_dir: PathBuf::from("./public"),
            proximity: ProximityConfig::default(),
            push_mode: PushMode::Origin,
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let listen_addr = match lookup("NEARBY_ADDR") {
            Some(addr) => parse("NEARBY_ADDR", &addr)?,
            None => match lookup("PORT") {
                Some(port) => SocketAddr::from(([0, 0, 0, 0], parse::<u16>("PORT", &port)?)),
                None => defaults.listen_addr,
            },
        };

        let static_dir = lookup("NEARBY_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let mut proximity = defaults.proximity;
        if let Some(radius) = lookup("NEARBY_RADIUS_METERS") {
            let radius: f64 = parse("NEARBY_RADIUS_METERS", &radius)?;
            if !radius.is_finite() || radius < 0.0 {
                return Err(Error::Config(format!("Invalid NEARBY_RADIUS_METERS: {radius}")));
            }
            proximity = proximity.with_radius(radius);
        }
        if let Some(ms) = lookup("NEARBY_STALE_AFTER_MS") {
            let ms: u64 = parse("NEARBY_STALE_AFTER_MS", &ms)?;
            proximity = proximity.with_stale_after(Duration::from_millis(ms));
        }

        let push_mode = match lookup("NEARBY_PUSH_MODE") {
            Some(mode) => mode.parse()?,
            None => defaults.push_mode,
        };

        Ok(Self {
            listen_addr,
            static_dir,
            proximity,
            push_mode,
        })
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {key}: {value}")))
}
