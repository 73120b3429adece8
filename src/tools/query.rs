//! SQL execution tool.
//!
//! This module implements the `execute_sql` MCP tool. Every query is vetted by
//! the [`QueryGuard`] before a connection is opened; rejections and execution
//! failures come back as text, while missing credentials and connection
//! failures are returned as errors.

use crate::db::{Connector, QueryExecutor};
use crate::error::DbResult;
use crate::tools::format::format_result;
use crate::tools::guard::QueryGuard;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, warn};

/// Input for the execute_sql tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteSqlInput {
    /// SQL statement to execute. In read-only mode, mutating statements are rejected.
    pub query: String,
}

/// Render a guard rejection as the text returned to the caller.
pub fn rejection_text(reason: &str) -> String {
    format!("Error: {}", reason)
}

/// Handler for raw SQL execution.
#[derive(Debug, Clone)]
pub struct SqlToolHandler {
    connector: Connector,
    guard: QueryGuard,
    executor: QueryExecutor,
}

impl SqlToolHandler {
    /// Create a new handler; the guard mode follows the connector's settings.
    pub fn new(connector: Connector) -> Self {
        let guard = QueryGuard::new(connector.settings().read_only);
        Self {
            connector,
            guard,
            executor: QueryExecutor::new(),
        }
    }

    /// Handle the execute_sql tool call.
    pub async fn execute_sql(&self, input: ExecuteSqlInput) -> DbResult<String> {
        if let Some(reason) = self.guard.evaluate(&input.query).rejection_reason() {
            warn!(read_only = self.guard.read_only(), reason = %reason, "Query rejected by guard");
            return Ok(rejection_text(&reason));
        }

        let mut scope = self.connector.open().await?;
        let result = self.executor.execute(scope.conn(), &input.query).await;
        scope.release().await;

        info!(
            read_only = self.guard.read_only(),
            failed = result.is_error(),
            row_count = result.row_count(),
            "execute_sql completed"
        );

        Ok(format_result(&result))
    }
}
