//! Integration tests for the execute_sql query guard.
//!
//! These tests verify that rejected queries never reach credential resolution
//! or the database, and that the rejection text matches what callers see.

use pg_mcp_gateway::config::Settings;
use pg_mcp_gateway::db::{Connector, CredentialResolver, SecretStore};
use pg_mcp_gateway::error::{DbError, DbResult};
use pg_mcp_gateway::tools::guard::{GuardVerdict, QueryGuard};
use pg_mcp_gateway::tools::query::{ExecuteSqlInput, SqlToolHandler};
use pg_mcp_gateway::tools::resource::TablePreviewHandler;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Secret store that records lookups and never yields a secret.
#[derive(Debug, Default)]
struct CountingStore {
    lookups: AtomicUsize,
}

impl SecretStore for CountingStore {
    fn secret_string(&self, secret_id: &str, _region: &str) -> DbResult<String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(DbError::configuration(format!("no secret {}", secret_id)))
    }
}

/// Helper to setup a handler whose every connection attempt is counted
fn setup_handler(read_only: bool) -> (SqlToolHandler, Arc<CountingStore>) {
    let settings = Arc::new(Settings {
        read_only,
        secret_id: Some("gateway/test".to_string()),
        ..Settings::default()
    });
    let store = Arc::new(CountingStore::default());
    let resolver = CredentialResolver::with_store(settings.clone(), store.clone());
    let handler = SqlToolHandler::new(Connector::with_resolver(settings, resolver));
    (handler, store)
}

async fn run(handler: &SqlToolHandler, query: &str) -> DbResult<String> {
    handler
        .execute_sql(ExecuteSqlInput {
            query: query.to_string(),
        })
        .await
}

// =========================================================================
// Read-only mode
// =========================================================================

#[tokio::test]
async fn test_read_only_blocks_delete_without_connecting() {
    let (handler, store) = setup_handler(true);

    let output = run(&handler, "DELETE FROM orders").await.unwrap();

    assert_eq!(
        output,
        "Error: Read-only mode is enabled. Detected mutating keywords: DELETE"
    );
    assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_read_only_lists_every_matched_keyword() {
    let (handler, store) = setup_handler(true);

    let output = run(&handler, "create table t as select 1 ; drop table t")
        .await
        .unwrap();

    assert_eq!(
        output,
        "Error: Read-only mode is enabled. Detected mutating keywords: CREATE, DROP"
    );
    assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_read_only_blocks_ddl_and_maintenance() {
    let (handler, _store) = setup_handler(true);

    for query in [
        "TRUNCATE orders",
        "ALTER TABLE orders ADD COLUMN note text",
        "GRANT SELECT ON orders TO reporting",
        "VACUUM orders",
        "REINDEX TABLE orders",
        "COMMENT ON TABLE orders IS 'x'",
    ] {
        let output = run(&handler, query).await.unwrap();
        assert!(
            output.starts_with("Error: Read-only mode is enabled."),
            "expected rejection for {query}, got {output}"
        );
    }
}

// =========================================================================
// Injection heuristics
// =========================================================================

#[tokio::test]
async fn test_comment_marker_blocked_in_any_mode() {
    for read_only in [true, false] {
        let (handler, store) = setup_handler(read_only);

        let output = run(&handler, "SELECT 1 -- x").await.unwrap();

        assert!(output.starts_with("Error: Query contains suspicious patterns: "));
        assert!(output.contains(r"Suspicious pattern detected: (--|\#|\/\*|\*\/|;)..."));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_plain_select_from_is_flagged() {
    let (handler, store) = setup_handler(true);

    let output = run(&handler, "SELECT id, total FROM orders").await.unwrap();

    assert!(output.starts_with("Error: Query contains suspicious patterns: "));
    assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_mutation_reported_before_injection() {
    let verdict = QueryGuard::new(true).evaluate("UPDATE orders SET total = 0 WHERE 1=1 OR 1=1;");
    assert_eq!(verdict, GuardVerdict::BlockedMutation(vec!["UPDATE".into()]));
}

// =========================================================================
// Allowed queries reach the connector
// =========================================================================

#[tokio::test]
async fn test_allowed_query_resolves_credentials() {
    let (handler, store) = setup_handler(true);

    let err = run(&handler, "SELECT 1").await.unwrap_err();

    assert!(matches!(err, DbError::Configuration { .. }));
    assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_write_allowed_when_not_read_only() {
    let (handler, store) = setup_handler(false);

    let err = run(&handler, "UPDATE orders SET total = 0").await.unwrap_err();

    assert!(matches!(err, DbError::Configuration { .. }));
    assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
}

// =========================================================================
// Table preview
// =========================================================================

#[tokio::test]
async fn test_preview_rejects_invalid_names_without_connecting() {
    let settings = Arc::new(Settings {
        secret_id: Some("gateway/test".to_string()),
        ..Settings::default()
    });
    let store = Arc::new(CountingStore::default());
    let resolver = CredentialResolver::with_store(settings.clone(), store.clone());
    let preview = TablePreviewHandler::new(Connector::with_resolver(settings, resolver));

    for name in ["", "orders;drop", "public.orders", "a b"] {
        assert_eq!(
            preview.read_table(name).await.unwrap(),
            "Error: Invalid table name"
        );
    }
    assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
}
