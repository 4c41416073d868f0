//! Table Checker Library
//!
//! This library answers `/health` and `/tables` requests with a JSON snapshot of
//! a relational schema (tables, columns, nullability, defaults, row counts) for
//! PostgreSQL, MySQL and SQLite databases.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod report;
pub mod transport;

pub use api::Responder;
pub use config::Config;
pub use error::DbError;
