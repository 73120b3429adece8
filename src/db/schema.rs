//! Schema introspection module.
//!
//! Lists the tables of a schema and describes their columns using the
//! PostgreSQL system catalogs.
//!
//! # Architecture
//!
//! SQL queries are organized in the `queries` submodule. Catalog failures never
//! propagate: they are logged and the operation yields an empty result.

use crate::error::{DbError, DbResult};
use crate::models::{ColumnDescriptor, ForeignKeyRef, TableDescriptor, TableKind, TableSchema};
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::Row;
use tracing::{debug, error, info};

/// Listed description of a relation without a comment.
pub const NO_DESCRIPTION: &str = "No description available";

/// Schema introspector for catalog queries.
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// List tables, views and materialized views of a schema, sorted by name.
    pub async fn list_tables(conn: &mut PgConnection, schema: &str) -> Vec<TableDescriptor> {
        match fetch_tables(conn, schema).await {
            Ok(tables) => {
                info!(count = tables.len(), schema = schema, "Listed tables");
                tables
            }
            Err(e) => {
                error!(schema = schema, error = %e, "Failed to list tables");
                Vec::new()
            }
        }
    }

    /// Describe the named tables of a schema.
    ///
    /// Tables are returned in name order; names that do not exist are omitted.
    pub async fn describe_tables(
        conn: &mut PgConnection,
        schema: &str,
        tables: &[String],
    ) -> Vec<TableSchema> {
        if tables.is_empty() {
            return Vec::new();
        }

        match fetch_columns(conn, schema, tables).await {
            Ok(rows) => {
                let schemas = group_columns(schema, rows);
                info!(
                    requested = tables.len(),
                    found = schemas.len(),
                    schema = schema,
                    "Described tables"
                );
                schemas
            }
            Err(e) => {
                error!(schema = schema, error = %e, "Failed to describe tables");
                Vec::new()
            }
        }
    }
}

// =============================================================================
// SQL Query Templates
// =============================================================================
//
// information_schema columns are domains over `name`/`varchar`; every text
// column is cast to `text` so it decodes as `String`.
//
// Foreign keys pair `conkey[i]` with `confkey[i]`, so each column of a
// composite key gets its own referenced column. A column in several foreign
// keys reports the constraint with the lowest name.

mod queries {
    pub const LIST_TABLES: &str = r#"
        SELECT table_name, table_type, description
        FROM (
            SELECT
                t.table_name::text AS table_name,
                t.table_type::text AS table_type,
                obj_description(c.oid, 'pg_class') AS description
            FROM information_schema.tables t
            LEFT JOIN pg_catalog.pg_namespace n
                ON n.nspname::text = t.table_schema::text
            LEFT JOIN pg_catalog.pg_class c
                ON c.relname::text = t.table_name::text AND c.relnamespace = n.oid
            WHERE t.table_schema::text = $1
            AND t.table_type IN ('BASE TABLE', 'VIEW')

            UNION ALL

            SELECT
                c.relname::text AS table_name,
                'MATERIALIZED VIEW' AS table_type,
                obj_description(c.oid, 'pg_class') AS description
            FROM pg_catalog.pg_class c
            JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
            WHERE n.nspname::text = $1
            AND c.relkind = 'm'
        ) listed
        ORDER BY table_name
        "#;

    pub const DESCRIBE_COLUMNS: &str = r#"
        WITH all_columns AS (
            SELECT
                a.attname::text AS column_name,
                pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type,
                CASE
                    WHEN a.atttypmod > 0 AND t.typname IN ('varchar', 'char', 'bpchar')
                    THEN a.atttypmod - 4
                    ELSE NULL
                END AS max_length,
                NOT a.attnotnull AS nullable,
                pg_catalog.pg_get_expr(ad.adbin, ad.adrelid) AS column_default,
                c.relname::text AS table_name,
                n.nspname::text AS table_schema,
                a.attnum AS ordinal_position,
                c.oid AS table_oid
            FROM pg_catalog.pg_class c
            JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
            JOIN pg_catalog.pg_attribute a ON a.attrelid = c.oid
            JOIN pg_catalog.pg_type t ON t.oid = a.atttypid
            LEFT JOIN pg_catalog.pg_attrdef ad ON ad.adrelid = c.oid AND ad.adnum = a.attnum
            WHERE c.relkind IN ('r', 'v', 'm')
            AND n.nspname::text = $1
            AND c.relname::text = ANY($2)
            AND a.attnum > 0
            AND NOT a.attisdropped
        )
        SELECT
            ac.column_name,
            ac.data_type,
            ac.max_length,
            ac.nullable,
            ac.column_default,
            col_desc.description AS column_description,
            tbl_desc.description AS table_description,
            ac.table_name,
            fk.referenced_schema,
            fk.referenced_table,
            fk.referenced_column
        FROM all_columns ac
        LEFT JOIN pg_catalog.pg_description col_desc
            ON col_desc.objoid = ac.table_oid
            AND col_desc.classoid = 'pg_catalog.pg_class'::regclass
            AND col_desc.objsubid = ac.ordinal_position
        LEFT JOIN pg_catalog.pg_description tbl_desc
            ON tbl_desc.objoid = ac.table_oid
            AND tbl_desc.classoid = 'pg_catalog.pg_class'::regclass
            AND tbl_desc.objsubid = 0
        LEFT JOIN LATERAL (
            SELECT
                rn.nspname::text AS referenced_schema,
                rc.relname::text AS referenced_table,
                ra.attname::text AS referenced_column
            FROM pg_catalog.pg_constraint con
            CROSS JOIN LATERAL unnest(con.conkey, con.confkey) AS k(local_attnum, referenced_attnum)
            JOIN pg_catalog.pg_class rc ON rc.oid = con.confrelid
            JOIN pg_catalog.pg_namespace rn ON rn.oid = rc.relnamespace
            JOIN pg_catalog.pg_attribute ra
                ON ra.attrelid = con.confrelid
                AND ra.attnum = k.referenced_attnum
            WHERE con.contype = 'f'
            AND con.conrelid = ac.table_oid
            AND k.local_attnum = ac.ordinal_position
            ORDER BY con.conname::text
            LIMIT 1
        ) fk ON true
        ORDER BY ac.table_name, ac.ordinal_position
        "#;
}

// =============================================================================
// Row Mapping
// =============================================================================

/// One row of the column description query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub table_name: String,
    pub table_description: Option<String>,
    pub column: ColumnDescriptor,
}

impl ColumnRow {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let referenced_table: Option<String> = row.try_get("referenced_table")?;
        let foreign_key = match referenced_table {
            Some(referenced_table) => Some(ForeignKeyRef {
                referenced_schema: row.try_get("referenced_schema")?,
                referenced_table,
                referenced_column: row.try_get("referenced_column")?,
            }),
            None => None,
        };

        Ok(Self {
            table_name: row.try_get("table_name")?,
            table_description: row.try_get("table_description")?,
            column: ColumnDescriptor {
                name: row.try_get("column_name")?,
                data_type: row.try_get("data_type")?,
                max_length: row.try_get("max_length")?,
                nullable: row.try_get("nullable")?,
                default: row.try_get("column_default")?,
                description: row.try_get("column_description")?,
                foreign_key,
            },
        })
    }
}

async fn fetch_tables(conn: &mut PgConnection, schema: &str) -> DbResult<Vec<TableDescriptor>> {
    let rows = sqlx::query(queries::LIST_TABLES)
        .bind(schema)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DbError::introspection(e.to_string()))?;

    let mut tables = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row
            .try_get("table_name")
            .map_err(|e| DbError::introspection(e.to_string()))?;
        let type_str: String = row
            .try_get("table_type")
            .map_err(|e| DbError::introspection(e.to_string()))?;
        let description: Option<String> = row
            .try_get("description")
            .map_err(|e| DbError::introspection(e.to_string()))?;

        match TableKind::parse(&type_str) {
            Some(table_type) => tables.push(TableDescriptor {
                name,
                table_type,
                description: Some(listed_description(description)),
            }),
            None => debug!(table = %name, table_type = %type_str, "Skipping unlisted relation kind"),
        }
    }

    Ok(dedupe_tables(tables))
}

async fn fetch_columns(
    conn: &mut PgConnection,
    schema: &str,
    tables: &[String],
) -> DbResult<Vec<ColumnRow>> {
    let rows = sqlx::query(queries::DESCRIBE_COLUMNS)
        .bind(schema)
        .bind(tables)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DbError::introspection(e.to_string()))?;

    rows.iter()
        .map(|row| ColumnRow::from_row(row).map_err(|e| DbError::introspection(e.to_string())))
        .collect()
}

/// Comment text for a listing, with a placeholder for missing or empty comments.
pub fn listed_description(comment: Option<String>) -> String {
    comment
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

/// Sort by name and keep the first entry for each name.
pub fn dedupe_tables(mut tables: Vec<TableDescriptor>) -> Vec<TableDescriptor> {
    tables.sort_by(|a, b| a.name.cmp(&b.name));
    tables.dedup_by(|later, earlier| later.name == earlier.name);
    tables
}

/// Group column rows by table, keeping first-seen table order.
pub fn group_columns(schema: &str, rows: Vec<ColumnRow>) -> Vec<TableSchema> {
    let mut grouped: Vec<TableSchema> = Vec::new();
    for row in rows {
        let position = grouped.iter().position(|t| t.name == row.table_name);
        let table = match position {
            Some(idx) => &mut grouped[idx],
            None => {
                grouped.push(TableSchema::new(
                    row.table_name.clone(),
                    schema,
                    row.table_description.clone(),
                ));
                let last = grouped.len() - 1;
                &mut grouped[last]
            }
        };
        table.columns.push(row.column);
    }
    grouped
}
