//! SQLite implementation of [`RecordStore`].
//!
//! Rows travel as JSON objects and are bound column by column. Table and
//! column names come from [`Collection`] and [`Query`] and are checked with
//! [`is_identifier`] before being spliced into SQL; values are always bound
//! as parameters.

use crate::db::db::Db;
use crate::db::schema::{index_ddl, table_ddl};
use crate::store::{is_identifier, Collection, Direction, Query, RecordId, RecordStore, Row, StoreError, StoreResult, ID_COLUMN};
use anyhow::Result;
use parking_lot::Mutex;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, ErrorCode};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    ensured: Mutex<HashSet<String>>,
}

impl SqliteStore {
    pub fn new(db: Db) -> Self {
        Self {
            conn: Arc::new(Mutex::new(db.conn)),
            ensured: Mutex::new(HashSet::new()),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Db::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Db::open_in_memory()?))
    }

    /// Creates the table behind `collection` the first time it is used.
    fn ensure_table(&self, conn: &Connection, collection: &Collection) -> StoreResult<()> {
        collection.validate()?;
        let table = collection.table();
        if self.ensured.lock().contains(table) {
            return Ok(());
        }

        let shared = collection.is_shared();
        conn.execute(&table_ddl(collection.kind(), table, shared), []).map_err(map_err)?;
        for statement in index_ddl(collection.kind(), table, shared) {
            conn.execute(&statement, []).map_err(map_err)?;
        }
        tracing::debug!(table, shared, "table ready");

        self.ensured.lock().insert(table.to_string());
        Ok(())
    }

    fn select(conn: &Connection, sql: &str, params: Vec<SqlValue>) -> StoreResult<Vec<Row>> {
        let mut stmt = conn.prepare(sql).map_err(map_err)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let rows = stmt
            .query_map(params_from_iter(params), |sql_row| {
                let mut row = Row::new();
                for (index, column) in columns.iter().enumerate() {
                    row.insert(column.clone(), from_sql(sql_row.get_ref(index)?));
                }
                Ok(row)
            })
            .map_err(map_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_err)?;

        Ok(rows)
    }
}

impl RecordStore for SqliteStore {
    async fn find(&self, collection: &Collection, query: &Query) -> StoreResult<Vec<Row>> {
        check_columns(query.columns())?;
        let conn = self.conn.lock();
        self.ensure_table(&conn, collection)?;

        let mut sql = format!("SELECT * FROM {}", collection.table());
        if !query.filters.is_empty() {
            let conditions: Vec<String> = query
                .filters
                .iter()
                .enumerate()
                .map(|(index, filter)| format!("{} = ?{}", filter.column, index + 1))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        if let Some(order) = &query.order {
            let direction = match order.direction {
                Direction::Ascending => "ASC",
                Direction::Descending => "DESC",
            };
            sql.push_str(&format!(" ORDER BY {} {direction}, {ID_COLUMN} {direction}", order.column));
        }

        let params = query.filters.iter().map(|f| to_sql(&f.value)).collect();
        let rows = Self::select(&conn, &sql, params)?;
        tracing::trace!(table = collection.table(), count = rows.len(), "find");
        Ok(rows)
    }

    async fn insert(&self, collection: &Collection, row: Row) -> StoreResult<Row> {
        check_columns(row.keys().map(String::as_str))?;
        let conn = self.conn.lock();
        self.ensure_table(&conn, collection)?;

        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            collection.table(),
            columns.join(", "),
            placeholders.join(", ")
        );
        conn.execute(&sql, params_from_iter(row.values().map(to_sql))).map_err(map_err)?;

        let id = conn.last_insert_rowid();
        tracing::debug!(table = collection.table(), id, "inserted");

        let sql = format!("SELECT * FROM {} WHERE {ID_COLUMN} = ?1", collection.table());
        Self::select(&conn, &sql, vec![SqlValue::Integer(id)])?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Unavailable(format!("inserted row {} not found in {}", id, collection.table())))
    }

    async fn update(&self, collection: &Collection, id: &RecordId, patch: Row) -> StoreResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        check_columns(patch.keys().map(String::as_str))?;
        let conn = self.conn.lock();
        self.ensure_table(&conn, collection)?;

        let assignments: Vec<String> = patch
            .keys()
            .enumerate()
            .map(|(index, column)| format!("{} = ?{}", column, index + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {ID_COLUMN} = ?{}",
            collection.table(),
            assignments.join(", "),
            patch.len() + 1
        );
        let mut params: Vec<SqlValue> = patch.values().map(to_sql).collect();
        params.push(to_sql(&id.to_value()));

        let affected = conn.execute(&sql, params_from_iter(params)).map_err(map_err)?;
        tracing::debug!(table = collection.table(), id = %id, affected, "updated");
        if affected == 0 {
            return Err(StoreError::NotFound {
                table: collection.table().to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, collection: &Collection, id: &RecordId) -> StoreResult<()> {
        let conn = self.conn.lock();
        self.ensure_table(&conn, collection)?;

        let sql = format!("DELETE FROM {} WHERE {ID_COLUMN} = ?1", collection.table());
        let affected = conn.execute(&sql, [to_sql(&id.to_value())]).map_err(map_err)?;
        tracing::debug!(table = collection.table(), id = %id, affected, "deleted");
        Ok(())
    }
}

fn check_columns<'a>(mut columns: impl Iterator<Item = &'a str>) -> StoreResult<()> {
    match columns.find(|column| !is_identifier(column)) {
        Some(column) => Err(StoreError::InvalidName(column.to_string())),
        None => Ok(()),
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => SqlValue::Integer(integer),
            None => SqlValue::Real(number.as_f64().unwrap_or_default()),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(integer) => Value::from(integer),
        ValueRef::Real(real) => Value::from(real),
        ValueRef::Text(text) | ValueRef::Blob(text) => Value::from(String::from_utf8_lossy(text).into_owned()),
    }
}

fn map_err(error: rusqlite::Error) -> StoreError {
    match &error {
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation => {
            StoreError::Conflict(error.to_string())
        }
        _ => StoreError::Unavailable(error.to_string()),
    }
}
