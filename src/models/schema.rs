//! Schema-related data models.
//!
//! This module defines types for database schema introspection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of relation listed by `get_tables`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum TableKind {
    #[serde(rename = "BASE TABLE")]
    BaseTable,
    #[serde(rename = "VIEW")]
    View,
    #[serde(rename = "MATERIALIZED VIEW")]
    MaterializedView,
}

impl TableKind {
    /// Parse the catalog spelling (`information_schema.tables.table_type`).
    ///
    /// Returns `None` for kinds the gateway never lists (foreign tables, temporaries).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BASE TABLE" => Some(Self::BaseTable),
            "VIEW" => Some(Self::View),
            "MATERIALIZED VIEW" => Some(Self::MaterializedView),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BaseTable => "BASE TABLE",
            Self::View => "VIEW",
            Self::MaterializedView => "MATERIALIZED VIEW",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table, view or materialized view in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub table_type: TableKind,
    /// Comment stored in the catalog, if any
    pub description: Option<String>,
}

/// Target of a foreign key column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKeyRef {
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Formatted type, e.g. `character varying(100)`
    #[serde(rename = "type")]
    pub data_type: String,
    /// Declared length for varchar/char columns
    pub max_length: Option<i32>,
    pub nullable: bool,
    /// Default expression
    pub default: Option<String>,
    pub description: Option<String>,
    pub foreign_key: Option<ForeignKeyRef>,
}

/// Columns of one table, in physical ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableSchema {
    pub name: String,
    pub schema: String,
    pub description: Option<String>,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    /// Create an empty table schema.
    pub fn new(
        name: impl Into<String>,
        schema: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            description,
            columns: Vec::new(),
        }
    }

    /// Find a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}
