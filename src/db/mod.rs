//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Connection provider (one connection per request, no pooling)
//! - Schema introspection
//! - Identifier allow-listing and quoting

pub mod connection;
pub mod ident;
pub mod schema;

pub use connection::{ConnectionProvider, DbConnection, SchemaCatalog, SqlxConnectionProvider};
pub use ident::{KnownTables, QuoteStyle, TableIdent, quote_identifier};
pub use schema::SchemaInspector;
