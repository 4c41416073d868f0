//! Connection-related data models.
//!
//! This module defines the parameters handed to the connection provider.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Namespace inspected on PostgreSQL when none is configured.
pub const DEFAULT_POSTGRES_NAMESPACE: &str = "public";

/// Supported database types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    #[value(name = "postgres", alias = "postgresql")]
    PostgreSQL,
    /// Includes MariaDB
    #[value(name = "mysql", alias = "mariadb")]
    MySQL,
    #[value(name = "sqlite")]
    SQLite,
}

impl DatabaseType {
    /// Get the display name for this database type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::MySQL => "MySQL",
            Self::SQLite => "SQLite",
        }
    }

    /// Get the default port for this database type.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::PostgreSQL => Some(5432),
            Self::MySQL => Some(3306),
            Self::SQLite => None,
        }
    }

    /// File-based backends need neither host nor credentials.
    pub fn is_file_based(&self) -> bool {
        matches!(self, Self::SQLite)
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Everything the connection provider needs to open one connection.
///
/// For SQLite, `database` is the path of the database file.
#[derive(Clone)]
pub struct ConnectionParams {
    pub db_type: DatabaseType,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    /// Contains sensitive data - never log
    password: String,
    /// Schema to inspect (PostgreSQL only)
    pub namespace: Option<String>,
}

impl ConnectionParams {
    /// Create parameters for the given backend and database, with the
    /// backend's default port and no host or credentials.
    pub fn new(db_type: DatabaseType, database: impl Into<String>) -> Self {
        Self {
            db_type,
            host: String::new(),
            port: db_type.default_port().unwrap_or(0),
            database: database.into(),
            user: String::new(),
            password: String::new(),
            namespace: None,
        }
    }

    /// Parameters for a SQLite database file.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self::new(DatabaseType::SQLite, path)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Namespace to inspect, falling back to `public`.
    pub fn namespace_or_default(&self) -> &str {
        self.namespace
            .as_deref()
            .unwrap_or(DEFAULT_POSTGRES_NAMESPACE)
    }

    /// Check that all fields required by the backend are present.
    pub fn validate(&self) -> Result<(), ConnectionParamsError> {
        if self.database.trim().is_empty() {
            return Err(ConnectionParamsError::MissingField("database"));
        }
        if self.db_type.is_file_based() {
            return Ok(());
        }
        if self.host.trim().is_empty() {
            return Err(ConnectionParamsError::MissingField("host"));
        }
        if self.port == 0 {
            return Err(ConnectionParamsError::InvalidPort);
        }
        if self.user.trim().is_empty() {
            return Err(ConnectionParamsError::MissingField("user"));
        }
        Ok(())
    }

    /// Display-safe description of the target (no credentials).
    pub fn target(&self) -> String {
        if self.db_type.is_file_based() {
            format!("sqlite:{}", self.database)
        } else {
            format!("{}:{}/{}", self.host, self.port, self.database)
        }
    }
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("db_type", &self.db_type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"****")
            .field("namespace", &self.namespace)
            .finish()
    }
}

/// Errors that can occur when validating connection parameters.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionParamsError {
    #[error("Missing required connection parameter: {0}")]
    MissingField(&'static str),

    #[error("Port must be greater than 0")]
    InvalidPort,
}
