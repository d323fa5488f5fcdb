//! WebSocket sessions.
//!
//! One socket is one session. Inbound text frames are decoded into
//! [`ClientEvent`]s and handed to the [`Hub`](crate::hub::Hub) in arrival
//! order; pushes from the hub are written by a separate task so a slow
//! client never blocks event processing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   text frames   ┌──────────┐   ClientEvent   ┌─────┐
//! │   Browser   │ ──────────────→ │  reader  │ ──────────────→ │     │
//! │             │                 └──────────┘                 │ Hub │
//! │             │   text frames   ┌──────────┐   ServerEvent   │     │
//! │             │ ←────────────── │  writer  │ ←────────────── │     │
//! └─────────────┘                 └──────────┘                 └─────┘
//! ```

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};

use crate::protocol::ClientEvent;
use crate::server::AppState;

/// WebSocket handler for participant sessions
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one session until the client goes away.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (id, mut events) = state.hub.connect().await;
    info!(%id, "participant connected");

    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let json = match event.to_json() {
                Ok(json) => json,
                Err(e) => {
                    error!(%id, "Failed to encode event: {}", e);
                    continue;
                }
            };
            if let Err(e) = sink.send(Message::Text(json.into())).await {
                warn!(%id, "Failed to push event: {}", e);
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => match ClientEvent::from_json(text.as_str()) {
                Ok(event) => state.hub.handle(id, event).await,
                Err(e) => {
                    warn!(%id, "Malformed frame: {}", e);
                    state.hub.reject(id, format!("malformed event: {e}")).await;
                }
            },
            Ok(Message::Close(_)) => break,
            // Pings are answered by the websocket layer
            Ok(other) => debug!(%id, "ignoring frame: {:?}", other),
            Err(e) => {
                warn!(%id, "WebSocket error: {}", e);
                break;
            }
        }
    }

    // Dropping the session's sender ends the writer loop
    state.hub.disconnect(id).await;
    if let Err(e) = writer.await {
        error!(%id, "Writer task failed: {}", e);
    }
    info!(%id, "participant disconnected");
}
