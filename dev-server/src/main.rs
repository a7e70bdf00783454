//! Development server for post-request UI development
//!
//! This binary serves the echo endpoints from test-helpers so the ui's POST
//! playground has something to talk to.
//!
//! Environment variables can be set directly or loaded from a .env file:
//! - DEV_SERVER_IP: bind address (defaults to 127.0.0.1)
//! - DEV_SERVER_PORT: port (defaults to 8000, 0 for an os-assigned port)
//!
//! Usage: cargo run -p dev-server

use actix_web::web;
use anyhow::{Context, Result};
use test_helpers::echo::{self, EchoConfig, EchoStats};
use test_helpers::telemetry::{get_subscriber, init_subscriber, log_error};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if available
    // This will silently ignore if the file doesn't exist
    let _ = dotenvy::dotenv();

    let subscriber = get_subscriber("info".into());
    init_subscriber(subscriber)?;

    info!("🚀 Starting post-request development server");

    let mut config = EchoConfig::from_env()?;
    let stats = web::Data::new(EchoStats::default());
    let server = echo::build(&mut config, stats.clone())
        .context("failed to bind development server")?;
    let server = tokio::spawn(server);

    let address = format!("http://{}:{}", config.ip, config.port);
    info!("✅ Echo server running on {address}");
    info!("   UI:  cd ui && BACKEND_URL={address} trunk serve");
    info!("   Try: POST {address}/api/echo, /api/slow/2000, /api/fail");
    info!("👋 Press Ctrl+C to shutdown");

    tokio::select! {
        result = server => {
            if let Err(e) = result.context("server task panicked")? {
                log_error(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Shutting down development server");
        }
    }

    info!("Answered {} POSTs", stats.posts());
    Ok(())
}
