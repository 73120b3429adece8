//! Data models for the PostgreSQL MCP gateway.
//!
//! This module re-exports all model types used throughout the application.

pub mod query;
pub mod schema;

// Re-export commonly used types
pub use query::{QueryResult, TABLE_PREVIEW_ROW_LIMIT};
pub use schema::{ColumnDescriptor, ForeignKeyRef, TableDescriptor, TableKind, TableSchema};
