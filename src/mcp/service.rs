//! MCP service implementation using rmcp.
//!
//! This module defines the GatewayService struct exposing the SQL gateway
//! tools and the table preview resource via the MCP protocol using the rmcp
//! framework's macros.

use crate::db::Connector;
use crate::tools::query::{ExecuteSqlInput, SqlToolHandler};
use crate::tools::resource::{TABLE_DATA_URI_TEMPLATE, TablePreviewHandler, table_name_from_uri};
use crate::tools::schema::{
    GetTableSchemasInput, GetTableSchemasOutput, GetTablesInput, GetTablesOutput,
    SchemaToolHandler,
};
use rmcp::Json;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        Implementation, ListResourceTemplatesResult, PaginatedRequestParam, ProtocolVersion,
        ReadResourceRequestParam, ReadResourceResult, ResourceContents, ResourceTemplate,
        ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde_json::json;

#[derive(Clone)]
pub struct GatewayService {
    sql: SqlToolHandler,
    schema: SchemaToolHandler,
    preview: TablePreviewHandler,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl GatewayService {
    /// Create a new GatewayService; every operation opens its own connection through `connector`.
    pub fn new(connector: Connector) -> Self {
        Self {
            sql: SqlToolHandler::new(connector.clone()),
            schema: SchemaToolHandler::new(connector.clone()),
            preview: TablePreviewHandler::new(connector),
            tool_router: Self::tool_router(),
        }
    }

    fn table_data_template() -> Result<ResourceTemplate, McpError> {
        serde_json::from_value(json!({
            "uriTemplate": TABLE_DATA_URI_TEMPLATE,
            "name": "table_data",
            "description": "Sample data from a table in the public schema (limited to 100 rows)",
            "mimeType": "text/plain",
        }))
        .map_err(|e| McpError::internal_error(format!("Invalid resource template: {}", e), None))
    }
}

#[tool_router]
impl GatewayService {
    #[tool(description = "List PostgreSQL tables, views and materialized views with their descriptions.")]
    async fn get_tables(
        &self,
        Parameters(input): Parameters<GetTablesInput>,
    ) -> Result<Json<GetTablesOutput>, McpError> {
        self.schema
            .get_tables(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Get schema information for tables including column details and foreign key relationships.\nUnknown table names are omitted from the result."
    )]
    async fn get_table_schemas(
        &self,
        Parameters(input): Parameters<GetTableSchemasInput>,
    ) -> Result<Json<GetTableSchemasOutput>, McpError> {
        self.schema
            .get_table_schemas(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Execute a SQL query against PostgreSQL.\nReturns comma-separated rows for SELECT/WITH, or the number of affected rows otherwise.\nIn read-only mode, mutating statements are rejected. Queries matching injection heuristics (comments, statement separators, tautologies) are rejected."
    )]
    async fn execute_sql(
        &self,
        Parameters(input): Parameters<ExecuteSqlInput>,
    ) -> Result<String, McpError> {
        self.sql.execute_sql(input).await.map_err(McpError::from)
    }
}

#[tool_handler]
impl ServerHandler for GatewayService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "pg-mcp-gateway".to_owned(),
                title: Some("PostgreSQL MCP Gateway".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Guarded SQL access to a PostgreSQL database.\n\
                \n\
                ## Workflow\n\
                1. Call `get_tables` to discover tables in a schema (default `public`)\n\
                2. Call `get_table_schemas` with table names to see columns and foreign keys\n\
                3. Call `execute_sql` to run a query\n\
                \n\
                ## Query Guard\n\
                - In read-only mode (default), statements containing mutating keywords are rejected\n\
                - Comments, `;`, tautologies like `OR 1=1` and some function names are rejected\n\
                \n\
                ## Resources\n\
                - `postgresql://{table_name}/data` returns up to 100 rows of a `public` table"
                    .to_string(),
            ),
        }
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult::with_all_items(vec![
            Self::table_data_template()?,
        ]))
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let table_name = table_name_from_uri(&uri).ok_or_else(|| {
            McpError::resource_not_found(
                format!("Unknown resource: {}", uri),
                Some(json!({ "uri_template": TABLE_DATA_URI_TEMPLATE })),
            )
        })?;

        let text = self
            .preview
            .read_table(table_name)
            .await
            .map_err(McpError::from)?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}
