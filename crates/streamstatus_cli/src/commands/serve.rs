//! Serve command implementation.

use std::net::SocketAddr;
use streamstatus_server::{ServerConfig, WebhookServer};

/// Runs the webhook server until interrupted.
pub fn run(bind: Option<SocketAddr>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env()?;
    if let Some(addr) = bind {
        config = config.with_bind_addr(addr);
    }
    tracing::debug!(?config, "loaded configuration");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let server = WebhookServer::new(config)?;
        server.serve().await
    })?;
    Ok(())
}
