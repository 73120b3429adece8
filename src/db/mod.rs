//! Database access layer.
//!
//! This module provides database access functionality:
//! - Credential resolution
//! - Scoped, unpooled connection acquisition
//! - Query execution
//! - Schema introspection
//! - Cell decoding

pub mod connection;
pub mod credentials;
pub mod executor;
pub mod schema;
pub mod types;

pub use connection::{ConnectionScope, Connector, ServerInfo};
pub use credentials::{CredentialResolver, Credentials, FileSecretStore, SecretStore};
pub use executor::{QueryExecutor, is_read_statement};
pub use schema::SchemaIntrospector;
