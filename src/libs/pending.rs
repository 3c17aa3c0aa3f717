//! Pending arrival kept between command-line invocations.
//!
//! `presence arrive` leaves the arrival key in `pending.json` so that a later
//! `presence depart` can resume the same session.

use super::data_storage::DataStorage;
use crate::libs::attendance::{ArrivalKey, AttendanceState};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const PENDING_FILE_NAME: &str = "pending.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingArrival {
    pub child: String,
    pub date: String,
    pub arrival: String,
}

impl PendingArrival {
    pub fn from_key(key: &ArrivalKey) -> Self {
        Self {
            child: key.child.to_string(),
            date: key.date.to_string(),
            arrival: key.arrival.to_string(),
        }
    }

    pub fn from_state(state: &AttendanceState) -> Option<Self> {
        match state {
            AttendanceState::AwaitingDeparture(key) => Some(Self::from_key(key)),
            AttendanceState::AwaitingArrival => None,
        }
    }
}

pub struct PendingStore {
    path: PathBuf,
}

impl PendingStore {
    pub fn new() -> Result<Self> {
        Self::in_storage(&DataStorage::new())
    }

    pub fn in_storage(storage: &DataStorage) -> Result<Self> {
        Ok(Self {
            path: storage.get_path(PENDING_FILE_NAME)?,
        })
    }

    pub fn load(&self) -> Result<Option<PendingArrival>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Writes the pending arrival, or removes the file when there is none.
    pub fn store(&self, pending: Option<&PendingArrival>) -> Result<()> {
        match pending {
            Some(pending) => fs::write(&self.path, serde_json::to_string_pretty(pending)?)?,
            None if self.path.exists() => fs::remove_file(&self.path)?,
            None => {}
        }
        Ok(())
    }

    /// Removes the file only if it still holds `completed`. Returns whether it did.
    pub fn release(&self, completed: &PendingArrival) -> Result<bool> {
        match self.load()? {
            Some(stored) if &stored == completed => {
                self.store(None)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
