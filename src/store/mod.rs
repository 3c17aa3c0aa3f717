//! Record store seam shared by every workflow.
//!
//! The workflows never talk to SQLite or to the hosted backend directly. They
//! resolve a [`Collection`] for the record kind and child they work on, build a
//! [`Query`] or a [`Row`] from it, and hand both to a [`RecordStore`]. Two
//! backends implement the trait:
//!
//! - [`crate::db::store::SqliteStore`] for a local database file
//! - [`crate::api::rest::RestStore`] for the hosted REST backend
//!
//! [`Backend`] picks one of them from the configuration.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nounou::store::{Addressing, ChildId, Direction, RecordKind, RecordStore};
//! use nounou::db::store::SqliteStore;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let store = SqliteStore::open_in_memory()?;
//! let child = ChildId::parse("caly")?;
//! let collection = Addressing::Shared.resolve(RecordKind::Activity, &child);
//! let query = collection.query().eq("date", "2024-01-01").order_by("heure", Direction::Descending);
//! let rows = store.find(&collection, &query).await?;
//! # Ok(())
//! # }
//! ```

pub mod collection;

pub use collection::{Addressing, ChildId, Collection, RecordKind, CHILD_COLUMN};

use crate::api::rest::RestStore;
use crate::db::store::SqliteStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One stored row, keyed by column name.
pub type Row = Map<String, Value>;

/// Column holding the store-assigned identifier in every table.
pub const ID_COLUMN: &str = "id";

/// Failures reported by a record store backend.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// The backend refused the write because it collides with a unique key.
    #[error("record conflicts with an existing entry: {0}")]
    Conflict(String),

    /// Transport or backend failure.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// The targeted row does not exist.
    #[error("no row {id} in {table}")]
    NotFound { table: String, id: String },

    /// A table or column name that cannot be used as an SQL identifier.
    #[error("invalid table or column name: {0}")]
    InvalidName(String),

    /// A row could not be converted to or from a record.
    #[error("malformed record: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Identifier assigned by the store on insert.
///
/// SQLite hands out integers while the hosted backend may use integers or
/// UUIDs, so the id is kept as an opaque string and converted back to a JSON
/// number when it looks like one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        match self.0.parse::<i64>() {
            Ok(number) => Value::from(number),
            Err(_) => Value::from(self.0.clone()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(StoreError::Decode("empty record id".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(number) => Ok(Self(number.to_string())),
            Value::String(text) => Ok(Self(text)),
            other => Err(serde::de::Error::custom(format!("unsupported record id: {}", other))),
        }
    }
}

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// Conjunction of equality filters with an optional ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            direction,
        });
        self
    }

    /// Lists every column name the query touches.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.filters
            .iter()
            .map(|f| f.column.as_str())
            .chain(self.order.iter().map(|o| o.column.as_str()))
    }
}

/// The four operations the workflows need from persistence.
///
/// Implementations must apply every filter of the query as an equality test
/// and honour the ordering when one is given.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Returns every row of the collection matching the query.
    async fn find(&self, collection: &Collection, query: &Query) -> StoreResult<Vec<Row>>;

    /// Inserts a row and returns it as stored, including its new id.
    async fn insert(&self, collection: &Collection, row: Row) -> StoreResult<Row>;

    /// Overwrites the given columns of the row with this id. Fails with
    /// [`StoreError::NotFound`] when no row has it.
    async fn update(&self, collection: &Collection, id: &RecordId, patch: Row) -> StoreResult<()>;

    /// Removes the row with this id. Removing a missing row is not an error.
    async fn delete(&self, collection: &Collection, id: &RecordId) -> StoreResult<()>;
}

impl<S: RecordStore> RecordStore for &S {
    async fn find(&self, collection: &Collection, query: &Query) -> StoreResult<Vec<Row>> {
        (**self).find(collection, query).await
    }

    async fn insert(&self, collection: &Collection, row: Row) -> StoreResult<Row> {
        (**self).insert(collection, row).await
    }

    async fn update(&self, collection: &Collection, id: &RecordId, patch: Row) -> StoreResult<()> {
        (**self).update(collection, id, patch).await
    }

    async fn delete(&self, collection: &Collection, id: &RecordId) -> StoreResult<()> {
        (**self).delete(collection, id).await
    }
}

/// Backend selected at runtime from the configuration.
pub enum Backend {
    Sqlite(SqliteStore),
    Rest(RestStore),
}

impl RecordStore for Backend {
    async fn find(&self, collection: &Collection, query: &Query) -> StoreResult<Vec<Row>> {
        match self {
            Backend::Sqlite(store) => store.find(collection, query).await,
            Backend::Rest(store) => store.find(collection, query).await,
        }
    }

    async fn insert(&self, collection: &Collection, row: Row) -> StoreResult<Row> {
        match self {
            Backend::Sqlite(store) => store.insert(collection, row).await,
            Backend::Rest(store) => store.insert(collection, row).await,
        }
    }

    async fn update(&self, collection: &Collection, id: &RecordId, patch: Row) -> StoreResult<()> {
        match self {
            Backend::Sqlite(store) => store.update(collection, id, patch).await,
            Backend::Rest(store) => store.update(collection, id, patch).await,
        }
    }

    async fn delete(&self, collection: &Collection, id: &RecordId) -> StoreResult<()> {
        match self {
            Backend::Sqlite(store) => store.delete(collection, id).await,
            Backend::Rest(store) => store.delete(collection, id).await,
        }
    }
}

/// Converts a stored row into a typed record.
pub fn decode<T: DeserializeOwned>(row: Row) -> StoreResult<T> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Converts a typed value into a row. The value must serialize as an object.
pub fn encode<T: Serialize>(value: &T) -> StoreResult<Row> {
    match serde_json::to_value(value).map_err(|e| StoreError::Decode(e.to_string()))? {
        Value::Object(row) => Ok(row),
        other => Err(StoreError::Decode(format!("expected an object, got {}", other))),
    }
}

/// True when `name` can be spliced into SQL or a URL path as-is.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
