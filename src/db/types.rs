//! Cell decoding.
//!
//! Statements sent as raw text use PostgreSQL's simple query protocol, so every
//! value arrives in the server's text output format. [`CellText`] accepts any
//! column type and keeps that text as-is, which gives the same rendering `psql`
//! shows for numerics, timestamps, arrays, json and so on.

use sqlx::error::BoxDynError;
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueFormat, PgValueRef};
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo, ValueRef};
use tracing::error;

/// Display string for SQL NULL.
pub const NULL_TEXT: &str = "NULL";

/// A cell value rendered as display text, for any column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellText(pub String);

impl Type<Postgres> for CellText {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}

/// Only text-format values are accepted; binary values come from prepared
/// statements, which the executor never sends.
impl<'r> Decode<'r, Postgres> for CellText {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        if matches!(value.format(), PgValueFormat::Binary) {
            return Err(format!(
                "unexpected binary-format value of type {}",
                value.type_info().name()
            )
            .into());
        }

        let is_bool = value.type_info().name() == "BOOL";
        let text = value.as_str()?;
        if is_bool {
            return Ok(CellText(bool_text(text == "t").to_string()));
        }
        Ok(CellText(text.to_string()))
    }
}

fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Column names of a row, in result order.
pub fn column_names(row: &PgRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

/// Render every cell of a row as display text.
pub fn row_to_strings(row: &PgRow) -> Vec<String> {
    (0..row.len())
        .map(|idx| match row.try_get::<Option<CellText>, _>(idx) {
            Ok(Some(cell)) => cell.0,
            Ok(None) => NULL_TEXT.to_string(),
            Err(e) => {
                error!(column = idx, error = %e, "Failed to decode column");
                NULL_TEXT.to_string()
            }
        })
        .collect()
}
