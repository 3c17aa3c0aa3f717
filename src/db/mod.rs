//! Local SQLite persistence.
//!
//! - [`db::Db`] opens the database file and applies migrations
//! - [`migrations`] versions the shared-table layout
//! - [`schema`] holds the table definitions for every record kind
//! - [`store::SqliteStore`] implements [`crate::store::RecordStore`] on top of it
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nounou::db::store::SqliteStore;
//! use std::path::Path;
//!
//! let store = SqliteStore::open(Path::new("nounou.db"))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Connection management.
pub mod db;

/// Versioned schema changes for the shared tables.
pub mod migrations;

pub mod schema;

/// Record store backed by a SQLite connection.
pub mod store;
