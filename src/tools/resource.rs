//! Table preview resource.
//!
//! Serves `postgresql://{table_name}/data`: the first rows of a table in the
//! `public` schema, formatted like `execute_sql` output. The query is built
//! from a validated identifier, so it does not go through the query guard.

use crate::db::{Connector, QueryExecutor};
use crate::error::DbResult;
use crate::models::{QueryResult, TABLE_PREVIEW_ROW_LIMIT};
use crate::tools::format::format_result;
use tracing::{info, warn};

pub const TABLE_DATA_URI_TEMPLATE: &str = "postgresql://{table_name}/data";
const URI_PREFIX: &str = "postgresql://";
const URI_SUFFIX: &str = "/data";
const PREVIEW_SCHEMA: &str = "public";

/// Extract the table name from a table data URI.
///
/// Returns `None` when the URI does not follow the template.
///
/// # Examples
///
/// ```
/// use pg_mcp_gateway::tools::resource::table_name_from_uri;
///
/// assert_eq!(table_name_from_uri("postgresql://orders/data"), Some("orders"));
/// assert_eq!(table_name_from_uri("postgresql://orders"), None);
/// ```
pub fn table_name_from_uri(uri: &str) -> Option<&str> {
    uri.strip_prefix(URI_PREFIX)?.strip_suffix(URI_SUFFIX)
}

/// Build the URI for a table's preview.
pub fn table_data_uri(table_name: &str) -> String {
    format!("{}{}{}", URI_PREFIX, table_name, URI_SUFFIX)
}

/// A table name is accepted when it is non-empty and only letters, digits and underscores.
pub fn is_valid_table_name(name: &str) -> bool {
    let stripped: String = name.chars().filter(|c| *c != '_').collect();
    !stripped.is_empty() && stripped.chars().all(char::is_alphanumeric)
}

/// Handler for the table preview resource.
#[derive(Debug, Clone)]
pub struct TablePreviewHandler {
    connector: Connector,
    executor: QueryExecutor,
}

impl TablePreviewHandler {
    pub fn new(connector: Connector) -> Self {
        Self {
            connector,
            executor: QueryExecutor::new(),
        }
    }

    /// Read up to the preview limit of rows from `public.<table_name>`.
    pub async fn read_table(&self, table_name: &str) -> DbResult<String> {
        if !is_valid_table_name(table_name) {
            warn!(table = %table_name, "Rejected table preview for invalid name");
            return Ok("Error: Invalid table name".to_string());
        }

        let query = format!(
            "SELECT * FROM {}.{} LIMIT {}",
            PREVIEW_SCHEMA, table_name, TABLE_PREVIEW_ROW_LIMIT
        );

        let mut scope = self.connector.open().await?;
        let result = self.executor.execute(scope.conn(), &query).await;
        scope.release().await;

        info!(table = %table_name, rows = result.row_count(), "Table preview read");

        Ok(match result {
            QueryResult::Error { message } => {
                format!("Error reading table {}: {}", table_name, message)
            }
            other => format_result(&other),
        })
    }
}
