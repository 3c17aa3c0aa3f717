//! Table definitions for every record kind.
//!
//! Shared tables carry an `enfant` column, per-child tables do not. The same
//! definitions back the versioned migrations (shared layout) and the on-demand
//! creation of `<kind>_<child>` tables.

use crate::store::RecordKind;

/// `CREATE TABLE` statement for a table holding records of `kind`.
pub fn table_ddl(kind: RecordKind, table: &str, shared: bool) -> String {
    let child_column = if shared { "\n    enfant TEXT NOT NULL," } else { "" };
    match kind {
        RecordKind::Attendance => format!(
            "CREATE TABLE IF NOT EXISTS {table} (
    id INTEGER PRIMARY KEY,{child_column}
    date TEXT NOT NULL,
    heure_arrive TEXT NOT NULL,
    heure_depart TEXT,
    duree TEXT
)"
        ),
        RecordKind::Activity => format!(
            "CREATE TABLE IF NOT EXISTS {table} (
    id INTEGER PRIMARY KEY,{child_column}
    date TEXT NOT NULL,
    heure TEXT NOT NULL,
    activite TEXT NOT NULL,
    observation TEXT
)"
        ),
        RecordKind::Photo => format!(
            "CREATE TABLE IF NOT EXISTS {table} (
    id INTEGER PRIMARY KEY,{child_column}
    date TEXT NOT NULL,
    url TEXT NOT NULL
)"
        ),
        RecordKind::Profile => format!(
            "CREATE TABLE IF NOT EXISTS {table} (
    id INTEGER PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL,
    enfant TEXT
)"
        ),
    }
}

/// Index statements that go with [`table_ddl`].
///
/// Attendance gets a unique index on the arrival key so that two sessions
/// racing on the same arrival cannot both insert.
pub fn index_ddl(kind: RecordKind, table: &str, shared: bool) -> Vec<String> {
    let scope = if shared { "enfant, " } else { "" };
    match kind {
        RecordKind::Attendance => vec![format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_arrival ON {table}({scope}date, heure_arrive)"
        )],
        RecordKind::Activity => vec![format!("CREATE INDEX IF NOT EXISTS idx_{table}_day ON {table}({scope}date, heure)")],
        RecordKind::Photo => vec![format!("CREATE INDEX IF NOT EXISTS idx_{table}_date ON {table}({scope}date)")],
        RecordKind::Profile => Vec::new(),
    }
}
