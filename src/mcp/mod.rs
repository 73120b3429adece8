//! MCP server integration module.
//!
//! This module wires the gateway tool and resource handlers into the MCP
//! protocol using the rmcp framework.

pub mod service;

pub use service::GatewayService;
