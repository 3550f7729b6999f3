//! In-memory tables of loosely typed rows, loaded once from a JSON file.
//!
//! All row mutation goes through one store-wide lock; see [`db::Database`].

pub mod commands;
pub mod config;
pub mod db;
pub mod db_types;
pub mod error;
pub mod query;
pub mod web;

pub use commands::{CommandOutput, DbCommand, SortSpec};
pub use db::Database;
pub use db_types::{Row, Tables, Value, ValueKind};
pub use error::{DbError, DbResult};
pub use query::{SortKey, search_records, sort_rows, sort_rows_as};
