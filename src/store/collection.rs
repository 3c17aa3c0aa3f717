//! Mapping from (record kind, child) to a physical table.
//!
//! The hosted schema went through two layouts. The first keeps one table per
//! record kind and tells children apart with an `enfant` column. The second
//! creates one table per child, named `<kind>_<child>` (`suivi_caly`,
//! `presence_nate`). [`Addressing::resolve`] hides that choice behind a
//! [`Collection`]: queries start from [`Collection::query`] and new rows from
//! [`Collection::row`], and both already carry the child scope when the layout
//! needs one.

use super::{is_identifier, Query, Row, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Discriminator column used by the shared-table layout.
pub const CHILD_COLUMN: &str = "enfant";

/// Identifier of a child, safe to splice into a table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChildId(String);

impl ChildId {
    /// Accepts lowercase ASCII letters, digits and underscores.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let candidate = raw.trim();
        let valid = !candidate.is_empty()
            && candidate
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(StoreError::InvalidName(raw.to_string()));
        }
        Ok(Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ChildId {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ChildId> for String {
    fn from(child: ChildId) -> Self {
        child.0
    }
}

/// Kinds of records kept by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Attendance,
    Activity,
    Photo,
    Profile,
}

impl RecordKind {
    /// Base table name, also the prefix of per-child tables.
    pub fn prefix(&self) -> &'static str {
        match self {
            RecordKind::Attendance => "presence",
            RecordKind::Activity => "suivi",
            RecordKind::Photo => "photos",
            RecordKind::Profile => "profiles",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Physical layout of child-owned tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Addressing {
    /// One table per kind, rows scoped by the `enfant` column.
    #[default]
    Shared,
    /// One table per kind and child, named `<kind>_<child>`.
    PerChild,
}

impl Addressing {
    pub fn resolve(&self, kind: RecordKind, child: &ChildId) -> Collection {
        match self {
            Addressing::Shared => Collection {
                kind,
                table: kind.prefix().to_string(),
                scope: Some(child.clone()),
            },
            Addressing::PerChild => Collection {
                kind,
                table: format!("{}_{}", kind.prefix(), child),
                scope: None,
            },
        }
    }
}

impl fmt::Display for Addressing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Addressing::Shared => f.write_str("shared"),
            Addressing::PerChild => f.write_str("per_child"),
        }
    }
}

impl FromStr for Addressing {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "shared" => Ok(Addressing::Shared),
            "per_child" => Ok(Addressing::PerChild),
            other => Err(StoreError::InvalidName(other.to_string())),
        }
    }
}

/// Handle on the physical table backing one (kind, child) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    kind: RecordKind,
    table: String,
    scope: Option<ChildId>,
}

impl Collection {
    /// The profiles table is never split per child.
    pub fn profiles() -> Self {
        Self {
            kind: RecordKind::Profile,
            table: RecordKind::Profile.prefix().to_string(),
            scope: None,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Child the rows are filtered on, when the table is shared.
    pub fn scope(&self) -> Option<&ChildId> {
        self.scope.as_ref()
    }

    pub fn is_shared(&self) -> bool {
        self.scope.is_some()
    }

    /// Fails for names that cannot be used verbatim by a backend.
    pub fn validate(&self) -> Result<(), StoreError> {
        if is_identifier(&self.table) {
            Ok(())
        } else {
            Err(StoreError::InvalidName(self.table.clone()))
        }
    }

    /// Empty query restricted to this collection's child.
    pub fn query(&self) -> Query {
        match &self.scope {
            Some(child) => Query::new().eq(CHILD_COLUMN, child.as_str()),
            None => Query::new(),
        }
    }

    /// Fresh row stamped with the child column when the table is shared.
    pub fn row(&self) -> Row {
        let mut row = Row::new();
        if let Some(child) = &self.scope {
            row.insert(CHILD_COLUMN.to_string(), Value::from(child.as_str()));
        }
        row
    }
}
