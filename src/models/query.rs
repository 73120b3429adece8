//! Query-related data models.

/// Maximum rows returned by the table preview resource.
pub const TABLE_PREVIEW_ROW_LIMIT: u32 = 100;

/// Outcome of running one SQL statement.
///
/// Exactly one variant is produced per execution. Cells are already converted
/// to their display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Result set of a read statement.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Outcome of a write statement.
    Affected { rows_affected: u64 },
    /// Driver-level failure during execution.
    Error { message: String },
}

impl QueryResult {
    /// Build a tabular result.
    pub fn rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self::Rows { columns, rows }
    }

    /// Build a rows-affected result.
    pub fn affected(rows_affected: u64) -> Self {
        Self::Affected { rows_affected }
    }

    /// Build an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Number of data rows (0 for non-tabular results).
    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows { rows, .. } => rows.len(),
            _ => 0,
        }
    }
}
