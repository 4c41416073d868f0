//! Configuration handling for the table checker.
//!
//! This module provides configuration management via CLI arguments and environment variables.
//! Database credentials are never compiled in: they come from the environment or from a
//! secret file mounted by the deployment platform.

use crate::api::DEFAULT_STAGE;
use crate::models::{ConnectionParams, DatabaseType};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// How requests reach the responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RunMode {
    /// HTTP server
    #[default]
    Http,
    /// Line-delimited proxy events on stdin/stdout
    Stdio,
    /// Print a one-shot schema report and exit
    Report,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Stdio => write!(f, "stdio"),
            Self::Report => write!(f, "report"),
        }
    }
}

/// Configuration for the table checker.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "table-checker",
    about = "Reports tables, columns and row counts of a SQL database",
    version,
    author
)]
pub struct Config {
    /// Run mode (http, stdio or report)
    #[arg(short, long, value_enum, default_value = "http", env = "TC_MODE")]
    pub mode: RunMode,

    /// HTTP host to bind to (only used in http mode)
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "TC_HTTP_HOST")]
    pub http_host: String,

    /// HTTP port to bind to (only used in http mode)
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "TC_HTTP_PORT")]
    pub http_port: u16,

    /// Deployment stage accepted as a path prefix, e.g. /prod/tables. Empty disables it.
    #[arg(long, default_value = DEFAULT_STAGE, env = "TC_STAGE")]
    pub stage: String,

    /// Database backend
    #[arg(long, value_enum, default_value = "postgres", env = "TC_DB_BACKEND")]
    pub db_backend: DatabaseType,

    /// Database host (ignored for sqlite)
    #[arg(long, env = "TC_DB_HOST")]
    pub db_host: Option<String>,

    /// Database port (defaults to the backend's standard port)
    #[arg(long, env = "TC_DB_PORT")]
    pub db_port: Option<u16>,

    /// Database name, or file path for sqlite
    #[arg(long, env = "TC_DB_NAME")]
    pub db_name: Option<String>,

    /// Database user
    #[arg(long, env = "TC_DB_USER")]
    pub db_user: Option<String>,

    /// Database password
    #[arg(long, env = "TC_DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// File containing the database password (takes precedence over --db-password)
    #[arg(long, value_name = "PATH", env = "TC_DB_PASSWORD_FILE")]
    pub db_password_file: Option<PathBuf>,

    /// Schema to inspect (postgres only, default: public)
    #[arg(long, env = "TC_DB_NAMESPACE")]
    pub db_namespace: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "TC_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "TC_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            mode: RunMode::Http,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            stage: DEFAULT_STAGE.to_string(),
            db_backend: DatabaseType::PostgreSQL,
            db_host: None,
            db_port: None,
            db_name: None,
            db_user: None,
            db_password: None,
            db_password_file: None,
            db_namespace: None,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Stage prefix, or `None` when disabled.
    pub fn stage(&self) -> Option<&str> {
        Some(self.stage.trim()).filter(|s| !s.is_empty())
    }

    /// Resolve the password from the secret file or the plain option.
    pub fn resolve_password(&self) -> Result<String, String> {
        match &self.db_password_file {
            Some(path) => std::fs::read_to_string(path)
                .map(|s| s.trim_end_matches(['\r', '\n']).to_string())
                .map_err(|e| format!("Failed to read password file {}: {}", path.display(), e)),
            None => Ok(self.db_password.clone().unwrap_or_default()),
        }
    }

    /// Build and validate connection parameters.
    pub fn connection_params(&self) -> Result<ConnectionParams, String> {
        let database = self.db_name.clone().unwrap_or_default();
        let mut params = ConnectionParams::new(self.db_backend, database);

        if !self.db_backend.is_file_based() {
            params = params
                .with_host(self.db_host.clone().unwrap_or_default())
                .with_credentials(
                    self.db_user.clone().unwrap_or_default(),
                    self.resolve_password()?,
                );
            if let Some(port) = self.db_port {
                params = params.with_port(port);
            }
        }
        if let Some(namespace) = self.db_namespace.as_deref().filter(|s| !s.is_empty()) {
            params = params.with_namespace(namespace);
        }

        params.validate().map_err(|e| e.to_string())?;
        Ok(params)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
