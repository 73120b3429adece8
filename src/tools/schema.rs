//! Schema introspection tools.
//!
//! This module implements the `get_tables` and `get_table_schemas` MCP tools.

use crate::db::{Connector, SchemaIntrospector};
use crate::error::DbResult;
use crate::models::{TableDescriptor, TableSchema};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_SCHEMA: &str = "public";

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

/// Input for the get_tables tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTablesInput {
    /// Schema name. Default: "public"
    #[serde(default = "default_schema")]
    pub schema_name: String,
}

/// Output from the get_tables tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GetTablesOutput {
    /// Tables, views and materialized views, sorted by name
    pub tables: Vec<TableDescriptor>,
    /// Number of entries returned
    pub count: usize,
}

/// Input for the get_table_schemas tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTableSchemasInput {
    /// Names of the tables to describe
    pub tables: Vec<String>,
    /// Schema name. Default: "public"
    #[serde(default = "default_schema")]
    pub schema_name: String,
}

/// Output from the get_table_schemas tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GetTableSchemasOutput {
    /// One entry per existing table, sorted by name; unknown names are omitted
    pub tables: Vec<TableSchema>,
    /// Number of tables described
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct SchemaToolHandler {
    connector: Connector,
}

impl SchemaToolHandler {
    pub fn new(connector: Connector) -> Self {
        Self { connector }
    }

    pub async fn get_tables(&self, input: GetTablesInput) -> DbResult<GetTablesOutput> {
        let mut scope = self.connector.open().await?;
        let tables = SchemaIntrospector::list_tables(scope.conn(), &input.schema_name).await;
        scope.release().await;

        info!(
            schema = %input.schema_name,
            count = tables.len(),
            "get_tables completed"
        );

        Ok(GetTablesOutput {
            count: tables.len(),
            tables,
        })
    }

    pub async fn get_table_schemas(
        &self,
        input: GetTableSchemasInput,
    ) -> DbResult<GetTableSchemasOutput> {
        let mut scope = self.connector.open().await?;
        let tables =
            SchemaIntrospector::describe_tables(scope.conn(), &input.schema_name, &input.tables)
                .await;
        scope.release().await;

        info!(
            schema = %input.schema_name,
            requested = input.tables.len(),
            count = tables.len(),
            "get_table_schemas completed"
        );

        Ok(GetTableSchemasOutput {
            count: tables.len(),
            tables,
        })
    }
}
