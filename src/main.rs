//! HaloPSA MCP server
//!
//! This binary runs as an MCP server using stdio transport, giving an
//! MCP client read-only access to a HaloPSA instance.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `HALO_BASE_URL`: Base URL of your HaloPSA instance
//! - `HALO_TENANT`: Tenant name
//! - `HALO_CLIENT_ID`: Client ID of the integration application
//! - `HALO_CLIENT_SECRET`: Client secret of the integration application
//!
//! # Usage
//!
//! ```bash
//! HALO_BASE_URL=https://acme.halopsa.com HALO_TENANT=acme \
//!   HALO_CLIENT_ID=xxx HALO_CLIENT_SECRET=yyy ./halopsa
//! ```

use anyhow::{Context, Result};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::{fmt, EnvFilter};

use halopsa::{config, halo_client, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // Log to stderr; stdout carries MCP JSON-RPC messages
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("halopsa=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting HaloPSA MCP server v{}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::from_env().context("Failed to load configuration")?;

    tracing::debug!(base_url = %config.base_url, tenant = %config.tenant, "Configuration loaded");

    let client = halo_client::HaloClient::new(&config).context("Failed to create HaloPSA client")?;

    // Test credentials before starting
    tracing::info!("Testing connection to HaloPSA...");
    if let Err(e) = client.test_connection().await {
        tracing::error!(error = %e, "Connection test failed");
        tracing::warn!(
            "Server will start but may not be able to reach HaloPSA. \
             Check configuration and network connectivity."
        );
    }

    let server = server::HaloServer::new(client);

    tracing::info!("Server initialized, starting stdio transport");

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })
        .context("Failed to start server")?;

    tracing::info!("Server running, waiting for requests");

    service
        .waiting()
        .await
        .context("Server error during operation")?;

    tracing::info!("Server shutting down");

    Ok(())
}
