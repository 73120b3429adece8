//! Configuration handling for the PostgreSQL MCP gateway.
//!
//! This module provides configuration management via CLI arguments and environment variables.
//! Process-level options (transport, logging) live on [`Config`]; everything the
//! operations need is grouped into [`Settings`], which is built once and shared
//! read-only behind an `Arc`.

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, ValueEnum};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8000;
pub const DEFAULT_MCP_ENDPOINT: &str = "/mcp";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_PG_PORT: u16 = 5432;
pub const DEFAULT_PG_USER: &str = "postgres";
pub const DEFAULT_PG_DBNAME: &str = "mcp_demo";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_SSL_MODE: &str = "prefer";

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for desktop MCP clients)
    #[default]
    Stdio,
    /// Streamable HTTP (for web clients)
    Http,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Per-process database and policy settings.
///
/// Never mutated after startup. The password is redacted from `Debug` output.
#[derive(Clone, Args)]
pub struct Settings {
    /// Enable debug logging
    #[arg(long, env = "DEBUG")]
    pub debug: bool,

    /// Block mutating SQL in execute_sql (pass `--read-only false` to allow writes)
    #[arg(
        long,
        env = "READ_ONLY_CONNECTION",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value_t = true
    )]
    pub read_only: bool,

    /// Secret identifier to resolve credentials from (path to a JSON secret document)
    #[arg(long, env = "SECRET_ID")]
    pub secret_id: Option<String>,

    /// Region of the secrets backend
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// PostgreSQL host (direct connection fallback)
    #[arg(long, env = "PG_HOST")]
    pub pg_host: Option<String>,

    /// PostgreSQL port
    #[arg(long, env = "PG_PORT", default_value_t = DEFAULT_PG_PORT)]
    pub pg_port: u16,

    /// PostgreSQL user
    #[arg(long, env = "PG_USER", default_value = DEFAULT_PG_USER)]
    pub pg_user: String,

    /// PostgreSQL password
    #[arg(long, env = "PG_PASSWORD", hide_env_values = true)]
    pub pg_password: Option<String>,

    /// PostgreSQL database name
    #[arg(long, env = "PG_DBNAME", default_value = DEFAULT_PG_DBNAME)]
    pub pg_dbname: String,

    /// SSL mode (disable, allow, prefer, require, verify-ca, verify-full)
    #[arg(long, env = "PG_SSL_MODE", default_value = DEFAULT_SSL_MODE)]
    pub ssl_mode: String,

    /// Connection timeout in seconds
    #[arg(long, env = "PG_CONNECT_TIMEOUT", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout: u64,
}

impl Settings {
    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Log filter derived from the debug flag, falling back to `default_level`.
    pub fn log_level<'a>(&self, default_level: &'a str) -> &'a str {
        if self.debug { "debug" } else { default_level }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            read_only: true,
            secret_id: None,
            region: DEFAULT_REGION.to_string(),
            pg_host: None,
            pg_port: DEFAULT_PG_PORT,
            pg_user: DEFAULT_PG_USER.to_string(),
            pg_password: None,
            pg_dbname: DEFAULT_PG_DBNAME.to_string(),
            ssl_mode: DEFAULT_SSL_MODE.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("debug", &self.debug)
            .field("read_only", &self.read_only)
            .field("secret_id", &self.secret_id)
            .field("region", &self.region)
            .field("pg_host", &self.pg_host)
            .field("pg_port", &self.pg_port)
            .field("pg_user", &self.pg_user)
            .field("pg_password", &self.pg_password.as_ref().map(|_| "***"))
            .field("pg_dbname", &self.pg_dbname)
            .field("ssl_mode", &self.ssl_mode)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Configuration for the PostgreSQL MCP gateway.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pg-mcp-gateway",
    about = "MCP server exposing a guarded SQL gateway to PostgreSQL",
    version,
    author
)]
pub struct Config {
    #[command(flatten)]
    pub settings: Settings,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "MCP_HTTP_HOST")]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "MCP_HTTP_PORT")]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(long, default_value = DEFAULT_MCP_ENDPOINT, env = "MCP_ENDPOINT")]
    pub mcp_endpoint: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,

    /// Connect once, print the server version and database, then exit
    #[arg(long)]
    pub check_connection: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            settings: Settings::default(),
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            check_connection: false,
        }
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Effective log filter, honouring the debug setting.
    pub fn effective_log_level(&self) -> &str {
        self.settings.log_level(&self.log_level)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
