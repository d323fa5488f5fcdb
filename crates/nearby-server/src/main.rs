//! Nearby server binary
//!
//! Configured through environment variables; see [`ServerConfig::from_env`].

use nearby_server::{NearbyServer, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nearby_server=info,nearby_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Nearby server");

    let config = ServerConfig::from_env()?;
    NearbyServer::new(config).serve().await?;

    Ok(())
}
