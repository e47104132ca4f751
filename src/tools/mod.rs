//! MCP tool inputs for the HaloPSA server.
//!
//! This module contains the input types for MCP tools that expose
//! read-only HaloPSA resource operations.

mod inputs;

pub use inputs::*;
