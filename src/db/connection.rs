//! Connection provider.
//!
//! Opens exactly one connection per request, using database-specific
//! connection types (PgConnection, MySqlConnection, SqliteConnection) rather
//! than a pool: nothing is shared between invocations.

use crate::db::ident::TableIdent;
use crate::error::{DbError, DbResult};
use crate::models::{ColumnDescriptor, ConnectionParams, DatabaseType};
use sqlx::{
    Connection, MySqlConnection, PgConnection, SqliteConnection, mysql::MySqlConnectOptions,
    postgres::PgConnectOptions, sqlite::SqliteConnectOptions,
};
use std::future::Future;
use tracing::{debug, info, warn};

/// Read access to a database catalog over one live connection.
pub trait SchemaCatalog: Send {
    /// Names of the user tables in the inspected namespace.
    fn list_tables(&mut self) -> impl Future<Output = DbResult<Vec<String>>> + Send;

    /// Column metadata in declaration order.
    fn fetch_columns(
        &mut self,
        table: &TableIdent,
    ) -> impl Future<Output = DbResult<Vec<ColumnDescriptor>>> + Send;

    /// Exact row count.
    fn count_rows(&mut self, table: &TableIdent) -> impl Future<Output = DbResult<u64>> + Send;

    /// Release the connection. Failures are logged, not returned.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Source of fresh connections.
pub trait ConnectionProvider: Send + Sync {
    type Connection: SchemaCatalog;

    /// Open a connection, or fail with [`DbError::Connection`].
    fn open(&self) -> impl Future<Output = DbResult<Self::Connection>> + Send;
}

/// A single live database connection.
#[derive(Debug)]
pub enum DbConnection {
    Postgres {
        conn: PgConnection,
        namespace: String,
    },
    MySql(MySqlConnection),
    SQLite(SqliteConnection),
}

impl DbConnection {
    /// Get the database type for this connection.
    pub fn db_type(&self) -> DatabaseType {
        match self {
            DbConnection::Postgres { .. } => DatabaseType::PostgreSQL,
            DbConnection::MySql(_) => DatabaseType::MySQL,
            DbConnection::SQLite(_) => DatabaseType::SQLite,
        }
    }

    pub(crate) async fn shutdown(self) {
        let db_type = self.db_type();
        let result = match self {
            DbConnection::Postgres { conn, .. } => conn.close().await,
            DbConnection::MySql(conn) => conn.close().await,
            DbConnection::SQLite(conn) => conn.close().await,
        };
        match result {
            Ok(()) => debug!(db_type = %db_type, "Closed database connection"),
            Err(e) => warn!(db_type = %db_type, error = %e, "Failed to close database connection"),
        }
    }
}

/// Provider backed by sqlx, configured once at construction time.
#[derive(Debug, Clone)]
pub struct SqlxConnectionProvider {
    params: ConnectionParams,
}

impl SqlxConnectionProvider {
    pub fn new(params: ConnectionParams) -> Self {
        Self { params }
    }

    async fn connect(&self) -> Result<DbConnection, sqlx::Error> {
        let p = &self.params;
        match p.db_type {
            DatabaseType::PostgreSQL => {
                let options = PgConnectOptions::new()
                    .host(&p.host)
                    .port(p.port)
                    .database(&p.database)
                    .username(&p.user)
                    .password(p.password());
                let conn = PgConnection::connect_with(&options).await?;
                Ok(DbConnection::Postgres {
                    conn,
                    namespace: p.namespace_or_default().to_string(),
                })
            }
            DatabaseType::MySQL => {
                let options = MySqlConnectOptions::new()
                    .host(&p.host)
                    .port(p.port)
                    .database(&p.database)
                    .username(&p.user)
                    .password(p.password());
                Ok(DbConnection::MySql(
                    MySqlConnection::connect_with(&options).await?,
                ))
            }
            DatabaseType::SQLite => {
                // Inspection never writes; a missing file is a connectivity failure
                let options = SqliteConnectOptions::new()
                    .filename(&p.database)
                    .create_if_missing(false)
                    .read_only(true);
                Ok(DbConnection::SQLite(
                    SqliteConnection::connect_with(&options).await?,
                ))
            }
        }
    }
}

impl ConnectionProvider for SqlxConnectionProvider {
    type Connection = DbConnection;

    async fn open(&self) -> DbResult<DbConnection> {
        let target = self.params.target();
        debug!(db_type = %self.params.db_type, target = %target, "Opening database connection");

        match self.connect().await {
            Ok(conn) => {
                info!(db_type = %self.params.db_type, target = %target, "Connected to database");
                Ok(conn)
            }
            Err(e) => {
                let err = DbError::from_connect(e);
                warn!(
                    target = %target,
                    error = %err,
                    suggestion = err.suggestion(),
                    "Database connection failed"
                );
                Err(err)
            }
        }
    }
}
