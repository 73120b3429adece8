//! MCP tool implementations.
//!
//! This module contains the tool and resource handlers:
//! - `query`: `execute_sql`, guarded raw SQL execution
//! - `schema`: `get_tables` and `get_table_schemas`
//! - `resource`: the `postgresql://{table_name}/data` table preview
//! - `guard`: mutation and injection heuristics applied to `execute_sql`
//! - `format`: comma-separated rendering of results

pub mod format;
pub mod guard;
pub mod query;
pub mod resource;
pub mod schema;

pub use guard::{GuardVerdict, QueryGuard};
pub use query::{ExecuteSqlInput, SqlToolHandler};
pub use resource::TablePreviewHandler;
pub use schema::{
    GetTableSchemasInput, GetTableSchemasOutput, GetTablesInput, GetTablesOutput,
    SchemaToolHandler,
};
