//! Nearby Server
//!
//! Real-time "who is near me" service. Participants open a WebSocket, opt in
//! with a handle, and keep reporting their location; after every report the
//! server pushes back the list of other fresh participants within the
//! proximity radius.
//!
//! # Architecture
//!
//! - **Hub**: owns the [`Registry`](nearby_core::Registry) and one push
//!   channel per session; processes events one at a time
//! - **WebSocket**: `/ws`, one session per socket, JSON frames
//! - **REST API**: `/health`, `/api/status`
//! - **Static**: everything else served from a directory
//!
//! # Example
//!
//! ```no_run
//! use nearby_server::{NearbyServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::from_env()?;
//!     NearbyServer::new(config).serve().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod hub;
pub mod protocol;
pub mod server;
pub mod ws;

pub use config::{PushMode, ServerConfig};
pub use error::{Error, Result};
pub use hub::Hub;
pub use protocol::{ClientEvent, ServerEvent};
pub use server::{AppState, NearbyServer};
