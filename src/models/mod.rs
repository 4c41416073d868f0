//! Data models for the table checker.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod schema;

// Re-export commonly used types
pub use connection::{
    ConnectionParams, ConnectionParamsError, DEFAULT_POSTGRES_NAMESPACE, DatabaseType,
};
pub use schema::{ColumnDescriptor, SchemaSnapshot, TableDescriptor};
