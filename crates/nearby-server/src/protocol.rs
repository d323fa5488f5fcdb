//! WebSocket wire protocol.
//!
//! JSON text frames tagged by `type`:
//!
//! ```text
//! client → server   {"type":"register","name":"Ada","handle":"@ada","lat":51.5,"lon":-0.12}
//!                   {"type":"update_location","lat":51.5,"lon":-0.12}
//!                   {"type":"stop"}
//! server → client   {"type":"nearby","participants":[{"name":"Bo","handle":"@bo","distance_meters":42}]}
//!                   {"type":"error","message":"..."}
//! ```

use nearby_core::NearbyParticipant;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Events sent by a participant's client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Opt in and (usually) report a first position
    Register {
        name: Option<String>,
        /// Missing handles decode as empty and are rejected by the consent gate
        #[serde(default)]
        handle: String,
        lat: Option<f64>,
        lon: Option<f64>,
    },
    /// Periodic position report
    UpdateLocation { lat: f64, lon: f64 },
    /// Stop sharing without closing the connection
    Stop,
}

impl ClientEvent {
    /// Decode a text frame.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Events pushed to a participant's client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Current nearby list, closest first
    Nearby { participants: Vec<NearbyParticipant> },
    /// An inbound frame was rejected; nothing changed
    Error { message: String },
}

impl ServerEvent {
    /// Encode as a text frame.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
