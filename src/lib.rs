//! # HaloPSA
//!
//! A client for the HaloPSA REST API, plus an MCP (Model Context Protocol)
//! server exposing its read-only operations as tools.
//!
//! ## Features
//!
//! - **Authentication**: OAuth2 client-credentials grant with lazy, on-demand
//!   token renewal. No background refresh, no automatic retries.
//! - **Resources**: List, count and look up Clients, Agents, Tickets, Assets
//!   and Suppliers with HaloPSA's default query parameters.
//! - **Security**: the client secret and access tokens are never logged or
//!   included in error messages.
//!
//! ## Architecture
//!
//! - [`config`] - Explicit configuration struct, loadable from the environment
//! - [`error`] - Error types with secret-aware message sanitization
//! - [`clock`] - Time sources used for token expiry
//! - [`params`] - Owned header/query mappings with reset-to-default
//! - [`auth`] - Credential store and session (token lifecycle)
//! - [`resources`] - Resource endpoints and their default queries
//! - [`halo_client`] - HTTP client for resource requests
//! - [`server`] - MCP server implementation with tool routing
//! - [`tools`] - Tool input parameter structs
//!
//! ## Configuration
//!
//! Required environment variables for the binary:
//!
//! - `HALO_BASE_URL`: Base URL of your HaloPSA instance
//! - `HALO_TENANT`: Tenant name
//! - `HALO_CLIENT_ID` / `HALO_CLIENT_SECRET`: Integration application credentials
//!
//! Optional: `HALO_AUTH_PATH`, `HALO_ACTION_PATH`, `HALO_SCOPE`,
//! `HALO_GRANT_TYPE`, `HALO_CONTENT_TYPE`, and `RUST_LOG` (e.g. `halopsa=debug`).
//!
//! ## Example
//!
//! ```ignore
//! use halopsa::config::Config;
//! use halopsa::halo_client::HaloClient;
//! use halopsa::resources::{ListParams, Resource};
//!
//! async fn example() -> Result<(), halopsa::error::HaloError> {
//!     let config = Config::new("https://acme.halopsa.com", "acme", "id", "secret");
//!     let client = HaloClient::new(&config)?;
//!
//!     // The first request authenticates; later ones reuse the token.
//!     for line in client.summaries(Resource::Clients, ListParams::new()).await? {
//!         println!("{}", line);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod halo_client;
pub mod params;
pub mod resources;
pub mod server;
pub mod tools;
