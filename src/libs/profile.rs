//! Role and child assignment of an authenticated user.

use crate::libs::error::{WorkflowError, WorkflowResult};
use crate::libs::fields::parse_child;
use crate::store::{decode, ChildId, Collection, RecordStore, CHILD_COLUMN};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Caregiver,
    Parent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Caregiver => f.write_str("nounou"),
            Role::Parent => f.write_str("parent"),
        }
    }
}

impl FromStr for Role {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nounou" => Ok(Role::Caregiver),
            "parent" => Ok(Role::Parent),
            _ => Err(WorkflowError::InvalidField {
                field: "role",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    user_id: String,
    role: String,
    #[serde(default)]
    enfant: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildProfile {
    pub user_id: String,
    pub role: Role,
    /// The parent's child; caregivers may have none.
    pub child: Option<ChildId>,
}

impl ChildProfile {
    fn from_row(row: ProfileRow) -> WorkflowResult<Self> {
        let role: Role = row.role.parse()?;
        let child = match row.enfant.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_child(raw)?),
            _ => None,
        };
        if role == Role::Parent && child.is_none() {
            return Err(WorkflowError::MissingField(CHILD_COLUMN));
        }
        Ok(Self {
            user_id: row.user_id,
            role,
            child,
        })
    }

    pub fn ensure_can_read(&self, child: &ChildId) -> WorkflowResult<()> {
        match self.role {
            Role::Caregiver => Ok(()),
            Role::Parent if self.child.as_ref() == Some(child) => Ok(()),
            Role::Parent => Err(WorkflowError::Forbidden(format!("{} cannot view {}", self.user_id, child))),
        }
    }

    pub fn ensure_can_write(&self, child: &ChildId) -> WorkflowResult<()> {
        match self.role {
            Role::Caregiver => Ok(()),
            Role::Parent => Err(WorkflowError::Forbidden(format!("{} cannot modify records of {}", self.user_id, child))),
        }
    }
}

pub struct Profiles<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> Profiles<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn fetch(&self, user_id: &str) -> WorkflowResult<ChildProfile> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(WorkflowError::MissingField("user_id"));
        }

        let collection = Collection::profiles();
        let query = collection.query().eq("user_id", user_id);
        let row = self
            .store
            .find(&collection, &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WorkflowError::ProfileNotFound(user_id.to_string()))?;

        let profile = ChildProfile::from_row(decode(row)?)?;
        tracing::debug!(user_id, role = %profile.role, "profile loaded");
        Ok(profile)
    }
}
