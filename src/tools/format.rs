//! Output formatting for tool results.
//!
//! Results are rendered as comma-separated text: a header line of column names
//! followed by one line per row. Values are not quoted or escaped, so a cell
//! containing a comma shifts the columns of its line.

use crate::models::QueryResult;

/// Render a query outcome as the text returned to the caller.
pub fn format_result(result: &QueryResult) -> String {
    match result {
        QueryResult::Rows { columns, rows } => format_rows(columns, rows),
        QueryResult::Affected { rows_affected } => {
            format!("Query executed successfully. Rows affected: {}", rows_affected)
        }
        QueryResult::Error { message } => format!("Error executing query: {}", message),
    }
}

/// Header line plus one comma-joined line per row.
pub fn format_rows(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(columns.join(","));
    lines.extend(rows.iter().map(|row| row.join(",")));
    lines.join("\n")
}
