//! Query execution engine.
//!
//! Runs one raw SQL string on a borrowed connection and turns the outcome into a
//! [`QueryResult`]. Driver failures never propagate past this point; they are
//! logged and returned as [`QueryResult::Error`].
//!
//! Read statements (`SELECT`, `WITH`) return every row. Anything else runs in
//! autocommit mode and reports the affected row count.

use crate::db::types::{column_names, row_to_strings};
use crate::error::DbError;
use crate::models::QueryResult;
use sqlx::postgres::PgConnection;
use sqlx::{Column, Executor};
use std::time::Instant;
use tracing::{debug, error, info};

/// Leading keywords that mark a statement as returning rows.
const READ_PREFIXES: &[&str] = &["SELECT", "WITH"];

/// Whether the query is treated as a read statement.
pub fn is_read_statement(query: &str) -> bool {
    let normalized = query.trim_start().to_uppercase();
    READ_PREFIXES.iter().any(|p| normalized.starts_with(p))
}

/// Query executor that handles raw SQL execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryExecutor;

impl QueryExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute a query and capture its outcome.
    pub async fn execute(&self, conn: &mut PgConnection, query: &str) -> QueryResult {
        let start = Instant::now();
        debug!(sql = %query, "Executing query");

        let outcome = if is_read_statement(query) {
            fetch_rows(conn, query).await
        } else {
            execute_write(conn, query).await
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(result) => {
                info!(
                    rows = result.row_count(),
                    execution_time_ms = elapsed_ms,
                    "Query executed"
                );
                result
            }
            Err(e) => {
                error!(error = %e, execution_time_ms = elapsed_ms, "Query execution failed");
                QueryResult::error(e.detail())
            }
        }
    }
}

async fn fetch_rows(conn: &mut PgConnection, query: &str) -> Result<QueryResult, DbError> {
    let rows = (&mut *conn).fetch_all(query).await?;

    let columns = match rows.first() {
        Some(row) => column_names(row),
        None => describe_columns(conn, query).await,
    };
    let rows = rows.iter().map(row_to_strings).collect();

    Ok(QueryResult::rows(columns, rows))
}

/// Column names for a statement that produced no rows.
///
/// Falls back to no columns when the statement cannot be prepared on its own.
async fn describe_columns(conn: &mut PgConnection, query: &str) -> Vec<String> {
    match (&mut *conn).describe(query).await {
        Ok(described) => described
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
        Err(e) => {
            debug!(error = %e, "Could not describe empty result");
            Vec::new()
        }
    }
}

async fn execute_write(conn: &mut PgConnection, query: &str) -> Result<QueryResult, DbError> {
    let result = (&mut *conn).execute(query).await?;
    Ok(QueryResult::affected(result.rows_affected()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_read() {
        assert!(is_read_statement("SELECT 1"));
        assert!(is_read_statement("  select * from orders"));
        assert!(is_read_statement("\n\tSelect id FROM t"));
    }

    #[test]
    fn test_with_is_read() {
        assert!(is_read_statement("WITH x AS (SELECT 1) SELECT * FROM x"));
        assert!(is_read_statement("with recent as (select 1) select 2"));
    }

    #[test]
    fn test_other_statements_are_writes() {
        assert!(!is_read_statement("UPDATE orders SET total = 0"));
        assert!(!is_read_statement("INSERT INTO t VALUES (1)"));
        assert!(!is_read_statement("EXPLAIN SELECT 1"));
        assert!(!is_read_statement("SHOW search_path"));
        assert!(!is_read_statement(""));
    }
}
