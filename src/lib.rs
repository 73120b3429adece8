//! PostgreSQL MCP Gateway Library
//!
//! This library exposes a PostgreSQL database to AI assistants over MCP (Model
//! Context Protocol): table listing, table descriptions, guarded raw SQL
//! execution and a table preview resource.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::{Config, Settings};
pub use error::{DbError, DbResult};
pub use mcp::GatewayService;
