//! Two-step attendance capture.
//!
//! A session first records an arrival, then completes the same record with a
//! departure and the time spent:
//!
//! ```text
//! AwaitingArrival --record_arrival--> AwaitingDeparture(key)
//!        ^                                   |
//!        +---- record_departure / cancel ----+
//! ```
//!
//! The session only remembers the natural key of the pending arrival
//! (child, date, arrival time) and re-reads the record before completing it.
//! Any failure leaves the state as it was so the form can be resubmitted.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nounou::db::store::SqliteStore;
//! use nounou::libs::attendance::AttendanceSession;
//! use nounou::store::Addressing;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let session = AttendanceSession::new(SqliteStore::open_in_memory()?, Addressing::Shared);
//! session.record_arrival("caly", "2024-01-01", "08:15").await?;
//! let record = session.record_departure("17:45").await?;
//! assert_eq!(record.duration.as_deref(), Some("09:30"));
//! # Ok(())
//! # }
//! ```

use crate::libs::duration::{compute_duration, ClockTime};
use crate::libs::error::{WorkflowError, WorkflowResult};
use crate::libs::fields::{parse_child, parse_clock, parse_date};
use crate::libs::notify::{Change, ChangeAction, ChangeHook, Notifier};
use crate::store::{
    decode, Addressing, ChildId, Collection, Direction, Query, RecordId, RecordKind, RecordStore, Row, StoreError,
};
use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

pub const ARRIVAL_COLUMN: &str = "heure_arrive";
pub const DEPARTURE_COLUMN: &str = "heure_depart";
pub const DURATION_COLUMN: &str = "duree";

/// One row of the `presence` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: RecordId,
    #[serde(rename = "enfant", default, skip_serializing_if = "Option::is_none")]
    pub child: Option<ChildId>,
    pub date: NaiveDate,
    #[serde(rename = "heure_arrive")]
    pub arrival: ClockTime,
    #[serde(rename = "heure_depart", default)]
    pub departure: Option<ClockTime>,
    #[serde(rename = "duree", default)]
    pub duration: Option<String>,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.departure.is_none()
    }
}

/// Natural key of an arrival: at most one record per (child, date, time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalKey {
    pub child: ChildId,
    pub date: NaiveDate,
    pub arrival: ClockTime,
}

impl ArrivalKey {
    pub fn parse(child: &str, date: &str, arrival: &str) -> WorkflowResult<Self> {
        Ok(Self {
            child: parse_child(child)?,
            date: parse_date(date)?,
            arrival: parse_clock(ARRIVAL_COLUMN, arrival)?,
        })
    }

    fn query(&self, collection: &Collection) -> Query {
        collection
            .query()
            .eq("date", self.date.to_string())
            .eq(ARRIVAL_COLUMN, self.arrival.to_string())
    }

    fn duplicate(&self) -> WorkflowError {
        WorkflowError::DuplicateEntry {
            child: self.child.to_string(),
            date: self.date.to_string(),
            arrival: self.arrival.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceState {
    AwaitingArrival,
    AwaitingDeparture(ArrivalKey),
}

/// Clears the busy flag when the submission ends, whatever the outcome.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct AttendanceSession<S: RecordStore> {
    store: S,
    addressing: Addressing,
    state: Mutex<AttendanceState>,
    prefill: Mutex<ClockTime>,
    busy: AtomicBool,
    notifier: Notifier,
}

impl<S: RecordStore> AttendanceSession<S> {
    pub fn new(store: S, addressing: Addressing) -> Self {
        Self {
            store,
            addressing,
            state: Mutex::new(AttendanceState::AwaitingArrival),
            prefill: Mutex::new(ClockTime::now()),
            busy: AtomicBool::new(false),
            notifier: Notifier::default(),
        }
    }

    pub fn with_hook(mut self, hook: ChangeHook) -> Self {
        self.notifier.set(hook);
        self
    }

    pub fn state(&self) -> AttendanceState {
        self.state.lock().clone()
    }

    /// Default value for the arrival field of the next form.
    pub fn arrival_prefill(&self) -> ClockTime {
        *self.prefill.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn begin(&self) -> WorkflowResult<InFlight<'_>> {
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(WorkflowError::Busy);
        }
        Ok(InFlight(&self.busy))
    }

    fn collection(&self, child: &ChildId) -> Collection {
        self.addressing.resolve(RecordKind::Attendance, child)
    }

    /// Step 1: stores a new arrival and waits for its departure.
    ///
    /// Recording an arrival while another one is pending abandons the pending
    /// one, which stays open in the store.
    pub async fn record_arrival(&self, child: &str, date: &str, arrival: &str) -> WorkflowResult<AttendanceRecord> {
        let _guard = self.begin()?;
        let key = ArrivalKey::parse(child, date, arrival)?;
        let collection = self.collection(&key.child);

        let existing = self.store.find(&collection, &key.query(&collection)).await?;
        if !existing.is_empty() {
            tracing::info!(child = %key.child, date = %key.date, arrival = %key.arrival, "duplicate arrival");
            return Err(key.duplicate());
        }

        let mut row = collection.row();
        row.insert("date".to_string(), Value::from(key.date.to_string()));
        row.insert(ARRIVAL_COLUMN.to_string(), Value::from(key.arrival.to_string()));
        row.insert(DEPARTURE_COLUMN.to_string(), Value::Null);
        row.insert(DURATION_COLUMN.to_string(), Value::Null);

        let created = match self.store.insert(&collection, row).await {
            Ok(created) => created,
            Err(StoreError::Conflict(_)) => return Err(key.duplicate()),
            Err(e) => return Err(e.into()),
        };
        let record: AttendanceRecord = decode(created)?;

        self.notifier.emit(Change {
            kind: RecordKind::Attendance,
            action: ChangeAction::Inserted,
            child: key.child.clone(),
            id: record.id.clone(),
        });
        *self.state.lock() = AttendanceState::AwaitingDeparture(key);

        Ok(record)
    }

    /// Binds an arrival recorded earlier, without inserting anything.
    pub fn resume(&self, child: &str, date: &str, arrival: &str) -> WorkflowResult<()> {
        let key = ArrivalKey::parse(child, date, arrival)?;
        *self.state.lock() = AttendanceState::AwaitingDeparture(key);
        Ok(())
    }

    /// Step 2: completes the pending arrival with a departure and its duration.
    pub async fn record_departure(&self, departure: &str) -> WorkflowResult<AttendanceRecord> {
        let _guard = self.begin()?;
        let departure = parse_clock(DEPARTURE_COLUMN, departure)?;
        let key = match &*self.state.lock() {
            AttendanceState::AwaitingDeparture(key) => key.clone(),
            AttendanceState::AwaitingArrival => return Err(WorkflowError::RecordNotFound),
        };
        let collection = self.collection(&key.child);

        let rows = self.store.find(&collection, &key.query(&collection)).await?;
        let record: AttendanceRecord = match rows.into_iter().next() {
            Some(row) => decode(row)?,
            None => return Err(WorkflowError::RecordNotFound),
        };

        let duration = compute_duration(key.arrival, departure)?;

        let mut patch = Row::new();
        patch.insert(DEPARTURE_COLUMN.to_string(), Value::from(departure.to_string()));
        patch.insert(DURATION_COLUMN.to_string(), Value::from(duration.clone()));
        self.store.update(&collection, &record.id, patch).await?;

        self.notifier.emit(Change {
            kind: RecordKind::Attendance,
            action: ChangeAction::Updated,
            child: key.child.clone(),
            id: record.id.clone(),
        });
        *self.state.lock() = AttendanceState::AwaitingArrival;
        *self.prefill.lock() = ClockTime::now();

        Ok(AttendanceRecord {
            departure: Some(departure),
            duration: Some(duration),
            ..record
        })
    }

    /// Drops the pending arrival without touching the stored record.
    pub fn cancel_departure(&self) {
        *self.state.lock() = AttendanceState::AwaitingArrival;
    }

    /// Deletes a record after `confirm` agrees. Returns whether it was deleted.
    pub async fn delete_record(&self, child: &str, id: &RecordId, confirm: impl FnOnce() -> bool) -> WorkflowResult<bool> {
        let child = parse_child(child)?;
        if !confirm() {
            return Ok(false);
        }
        self.store.delete(&self.collection(&child), id).await?;

        self.notifier.emit(Change {
            kind: RecordKind::Attendance,
            action: ChangeAction::Deleted,
            child,
            id: id.clone(),
        });
        Ok(true)
    }

    pub async fn list(&self, child: &ChildId, date: NaiveDate) -> WorkflowResult<Vec<AttendanceRecord>> {
        list_attendance(&self.store, self.addressing, child, date).await
    }
}

/// Attendance of a child on a date, latest arrival first.
pub async fn list_attendance<S: RecordStore>(
    store: &S,
    addressing: Addressing,
    child: &ChildId,
    date: NaiveDate,
) -> WorkflowResult<Vec<AttendanceRecord>> {
    let collection = addressing.resolve(RecordKind::Attendance, child);
    let query = collection
        .query()
        .eq("date", date.to_string())
        .order_by(ARRIVAL_COLUMN, Direction::Descending);

    store
        .find(&collection, &query)
        .await?
        .into_iter()
        .map(|row| decode(row).map_err(WorkflowError::from))
        .collect()
}
