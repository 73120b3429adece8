//! Credential resolution.
//!
//! Credentials come from a secrets backend when `SECRET_ID` is configured, and
//! from the direct-connection settings otherwise. A failing secrets lookup is
//! logged and falls through to the direct settings.

use crate::config::{DEFAULT_PG_PORT, Settings};
use crate::error::{DbError, DbResult};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolved connection credentials. Never logged; `Debug` redacts the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Port in a secret document may be stored as a number or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum SecretPort {
    Number(u16),
    Text(String),
}

/// Shape of the JSON secret (the layout RDS-managed secrets use).
#[derive(Deserialize)]
struct SecretDocument {
    host: String,
    #[serde(default)]
    port: Option<SecretPort>,
    username: String,
    password: String,
    dbname: String,
}

impl Credentials {
    /// Parse credentials from a JSON secret string.
    pub fn from_secret_json(secret: &str) -> DbResult<Self> {
        let doc: SecretDocument = serde_json::from_str(secret)
            .map_err(|e| DbError::configuration(format!("Malformed database secret: {}", e)))?;

        let port = match doc.port {
            None => DEFAULT_PG_PORT,
            Some(SecretPort::Number(port)) => port,
            Some(SecretPort::Text(text)) => text.trim().parse().map_err(|_| {
                DbError::configuration(format!("Invalid port in database secret: {}", text))
            })?,
        };

        Ok(Self {
            host: doc.host,
            port,
            user: doc.username,
            password: doc.password,
            database: doc.dbname,
        })
    }

    /// Build credentials from the direct-connection settings.
    ///
    /// Host and password are mandatory; user and database fall back to their defaults.
    pub fn from_settings(settings: &Settings) -> DbResult<Self> {
        match (&settings.pg_host, &settings.pg_password) {
            (Some(host), Some(password)) if !host.is_empty() => Ok(Self {
                host: host.clone(),
                port: settings.pg_port,
                user: settings.pg_user.clone(),
                password: password.clone(),
                database: settings.pg_dbname.clone(),
            }),
            _ => Err(DbError::configuration(
                "Database connection info not found. Set SECRET_ID or PG_HOST/PG_PASSWORD.",
            )),
        }
    }
}

/// A backend that returns the raw secret string for an identifier.
///
/// Lookups may block; the resolver calls them on tokio's blocking pool.
pub trait SecretStore: Send + Sync + fmt::Debug {
    fn secret_string(&self, secret_id: &str, region: &str) -> DbResult<String>;
}

/// Secret store backed by JSON files on disk; the secret id is the file path.
///
/// Fits secrets mounted into containers by an orchestrator.
#[derive(Debug, Clone, Default)]
pub struct FileSecretStore {
    base_dir: Option<PathBuf>,
}

impl FileSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative secret ids against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn path_for(&self, secret_id: &str) -> PathBuf {
        let path = PathBuf::from(secret_id);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

impl SecretStore for FileSecretStore {
    fn secret_string(&self, secret_id: &str, _region: &str) -> DbResult<String> {
        let path = self.path_for(secret_id);
        std::fs::read_to_string(&path).map_err(|e| {
            DbError::configuration(format!(
                "Failed to read secret '{}' from {}: {}",
                secret_id,
                path.display(),
                e
            ))
        })
    }
}

/// Resolves credentials per connection attempt.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    settings: Arc<Settings>,
    store: Arc<dyn SecretStore>,
}

impl CredentialResolver {
    /// Create a resolver using the file-backed secret store.
    pub fn new(settings: Arc<Settings>) -> Self {
        Self::with_store(settings, Arc::new(FileSecretStore::new()))
    }

    /// Create a resolver with a custom secret store.
    pub fn with_store(settings: Arc<Settings>, store: Arc<dyn SecretStore>) -> Self {
        Self { settings, store }
    }

    /// Resolve credentials: secret first, direct settings as fallback.
    pub async fn resolve(&self) -> DbResult<Credentials> {
        if let Some(secret_id) = &self.settings.secret_id {
            match self.fetch_secret(secret_id).await {
                Ok(credentials) => {
                    debug!(secret_id = %secret_id, "Resolved credentials from secret");
                    return Ok(credentials);
                }
                Err(e) => {
                    warn!(
                        secret_id = %secret_id,
                        region = %self.settings.region,
                        error = %e,
                        "Failed to resolve secret, falling back to direct connection settings"
                    );
                }
            }
        }

        Credentials::from_settings(&self.settings)
    }

    async fn fetch_secret(&self, secret_id: &str) -> DbResult<Credentials> {
        let store = Arc::clone(&self.store);
        let secret_id = secret_id.to_string();
        let region = self.settings.region.clone();
        let secret = tokio::task::spawn_blocking(move || store.secret_string(&secret_id, &region))
            .await
            .map_err(|e| DbError::internal(format!("Secret lookup task failed: {}", e)))??;
        Credentials::from_secret_json(&secret)
    }
}
