//! Warehouse connection settings.

use std::fmt;
use std::path::PathBuf;

use crate::error::{self, WarehouseError};

pub const ENV_BACKEND: &str = "DB_BACKEND";
pub const ENV_HOST: &str = "DB_HOST";
pub const ENV_PORT: &str = "DB_PORT";
pub const ENV_DATABASE: &str = "DB_NAME";
pub const ENV_USER: &str = "DB_USER";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_SCHEMA: &str = "DB_SCHEMA";
pub const ENV_SQLITE_PATH: &str = "DB_PATH";

/// Which warehouse driver to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    Postgres,
    /// Local file-backed warehouse, mostly for development runs.
    Sqlite { path: PathBuf },
}

/// Connection settings for the target warehouse.
///
/// Built once at startup and passed by reference; nothing below the CLI
/// reads the environment directly.
#[derive(Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    pub backend: BackendKind,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    /// `None` means passwordless (trust / peer) authentication.
    pub password: Option<String>,
    /// Schema placed on the session's search path.
    pub schema: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "ecommerce_dw".to_string()
}

fn default_schema() -> String {
    "ecommerce_dw".to_string()
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("ecommerce_dw.sqlite3")
}

fn default_user() -> String {
    whoami::username()
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Postgres,
            host: default_host(),
            port: default_port(),
            database: default_database(),
            user: default_user(),
            password: None,
            schema: default_schema(),
        }
    }
}

impl WarehouseConfig {
    /// Resolve settings through `lookup` (usually the process environment).
    ///
    /// Unset or empty variables fall back to defaults; a missing user falls
    /// back to the OS-reported current user.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::Config`] for an unknown backend or a port
    /// that is not a valid `u16`.
    pub fn from_lookup<F>(lookup: F) -> error::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get(ENV_BACKEND).as_deref().map(str::trim) {
            None | Some("postgres" | "postgresql") => BackendKind::Postgres,
            Some("sqlite") => BackendKind::Sqlite {
                path: get(ENV_SQLITE_PATH).map_or_else(default_sqlite_path, PathBuf::from),
            },
            Some(other) => {
                return Err(WarehouseError::Config(format!(
                    "{ENV_BACKEND}='{other}' is not supported. Must be 'postgres' or 'sqlite'"
                )))
            }
        };

        let port = match get(ENV_PORT) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                WarehouseError::Config(format!("{ENV_PORT}='{raw}' is not a valid port: {e}"))
            })?,
            None => default_port(),
        };

        Ok(Self {
            backend,
            host: get(ENV_HOST).unwrap_or_else(default_host),
            port,
            database: get(ENV_DATABASE).unwrap_or_else(default_database),
            user: get(ENV_USER).unwrap_or_else(default_user),
            password: get(ENV_PASSWORD),
            schema: get(ENV_SCHEMA).unwrap_or_else(default_schema),
        })
    }

    /// Resolve settings from the process environment.
    ///
    /// # Errors
    ///
    /// See [`WarehouseConfig::from_lookup`].
    pub fn from_env() -> error::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Human-readable target, safe to log (never includes the password).
    #[must_use]
    pub fn target(&self) -> String {
        match &self.backend {
            BackendKind::Postgres => format!(
                "{}@{}:{}/{} (schema: {})",
                self.user, self.host, self.port, self.database, self.schema
            ),
            BackendKind::Sqlite { path } => format!("sqlite:{}", path.display()),
        }
    }
}

impl fmt::Debug for WarehouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("schema", &self.schema)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = WarehouseConfig::from_lookup(lookup(&[("DB_USER", "etl")])).unwrap();
        assert_eq!(config.backend, BackendKind::Postgres);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.database, "ecommerce_dw");
        assert_eq!(config.schema, "ecommerce_dw");
        assert_eq!(config.user, "etl");
        assert!(config.password.is_none());
    }

    #[test]
    fn missing_user_falls_back_to_os_user() {
        let config = WarehouseConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.user, whoami::username());
    }

    #[test]
    fn empty_password_means_passwordless() {
        let config =
            WarehouseConfig::from_lookup(lookup(&[("DB_PASSWORD", ""), ("DB_USER", "etl")]))
                .unwrap();
        assert!(config.password.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = WarehouseConfig::from_lookup(lookup(&[
            ("DB_HOST", "warehouse.internal"),
            ("DB_PORT", "6543"),
            ("DB_NAME", "dw"),
            ("DB_USER", "loader"),
            ("DB_PASSWORD", "s3cret"),
            ("DB_SCHEMA", "staging"),
        ]))
        .unwrap();
        assert_eq!(config.host, "warehouse.internal");
        assert_eq!(config.port, 6543);
        assert_eq!(config.database, "dw");
        assert_eq!(config.password.as_deref(), Some("s3cret"));
        assert_eq!(config.schema, "staging");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = WarehouseConfig::from_lookup(lookup(&[("DB_PORT", "not-a-port")])).unwrap_err();
        assert!(err.to_string().contains("DB_PORT"), "got: {err}");
    }

    #[test]
    fn sqlite_backend_reads_path() {
        let config = WarehouseConfig::from_lookup(lookup(&[
            ("DB_BACKEND", "sqlite"),
            ("DB_PATH", "/tmp/dw.sqlite3"),
        ]))
        .unwrap();
        assert_eq!(
            config.backend,
            BackendKind::Sqlite {
                path: PathBuf::from("/tmp/dw.sqlite3")
            }
        );
        assert_eq!(config.target(), "sqlite:/tmp/dw.sqlite3");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = WarehouseConfig::from_lookup(lookup(&[("DB_BACKEND", "oracle")])).unwrap_err();
        assert!(matches!(err, WarehouseError::Config(_)));
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = WarehouseConfig {
            password: Some("hunter2".into()),
            ..WarehouseConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
