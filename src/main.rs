//! PostgreSQL MCP Gateway - Main entry point.
//!
//! Serves guarded SQL access to one PostgreSQL database over MCP (stdio or
//! streamable HTTP), or runs a one-shot connection check.

use clap::Parser;
use pg_mcp_gateway::config::{Config, TransportMode};
use pg_mcp_gateway::db::Connector;
use pg_mcp_gateway::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries the stdio transport.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.effective_log_level()));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    init_tracing(&config);

    let settings = Arc::new(config.settings.clone());
    info!(
        transport = %config.transport,
        read_only = settings.read_only,
        "Starting PostgreSQL MCP Gateway v{}",
        env!("CARGO_PKG_VERSION")
    );

    let connector = Connector::new(settings);

    if config.check_connection {
        return match connector.check().await {
            Ok(server) => {
                println!("Connected to database: {}", server.database);
                println!("PostgreSQL version: {}", server.version);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Connection check failed");
                if let Some(suggestion) = e.suggestion() {
                    eprintln!("Hint: {}", suggestion);
                }
                Err(e.into())
            }
        };
    }

    let result = match config.transport {
        TransportMode::Stdio => StdioTransport::new(connector).run().await,
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            HttpTransport::new(
                connector,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            )
            .run()
            .await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
