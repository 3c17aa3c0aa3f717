//! Daily activity log: meals, naps and care entries.

use crate::libs::duration::ClockTime;
use crate::libs::error::{WorkflowError, WorkflowResult};
use crate::libs::fields::{optional_text, parse_child, parse_clock, parse_date};
use crate::libs::notify::{Change, ChangeAction, ChangeHook, Notifier};
use crate::store::{decode, Addressing, ChildId, Direction, RecordId, RecordKind, RecordStore};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const TIME_COLUMN: &str = "heure";
pub const ACTIVITY_COLUMN: &str = "activite";
pub const OBSERVATION_COLUMN: &str = "observation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityCategory {
    Daily,
    Care,
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityCategory::Daily => f.write_str("quotidien"),
            ActivityCategory::Care => f.write_str("soins"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    Meal,
    NapStart,
    NapEnd,
    Snack,
    Care,
    Diaper,
    Needs,
}

impl ActivityType {
    pub const ALL: [ActivityType; 7] = [
        ActivityType::Meal,
        ActivityType::NapStart,
        ActivityType::NapEnd,
        ActivityType::Snack,
        ActivityType::Care,
        ActivityType::Diaper,
        ActivityType::Needs,
    ];

    /// Value stored in the `activite` column.
    pub fn label(&self) -> &'static str {
        match self {
            ActivityType::Meal => "Repas",
            ActivityType::NapStart => "Début sieste",
            ActivityType::NapEnd => "Fin sieste",
            ActivityType::Snack => "Goûter",
            ActivityType::Care => "Soins",
            ActivityType::Diaper => "Change",
            ActivityType::Needs => "Besoins",
        }
    }

    /// ASCII spelling accepted on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            ActivityType::Meal => "repas",
            ActivityType::NapStart => "debut_sieste",
            ActivityType::NapEnd => "fin_sieste",
            ActivityType::Snack => "gouter",
            ActivityType::Care => "soins",
            ActivityType::Diaper => "change",
            ActivityType::Needs => "besoins",
        }
    }

    pub fn category(&self) -> ActivityCategory {
        match self {
            ActivityType::Meal | ActivityType::NapStart | ActivityType::NapEnd | ActivityType::Snack => {
                ActivityCategory::Daily
            }
            ActivityType::Care | ActivityType::Diaper | ActivityType::Needs => ActivityCategory::Care,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ActivityType {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ActivityType::ALL
            .into_iter()
            .find(|t| t.label().to_lowercase() == wanted || t.key() == wanted.replace([' ', '-'], "_"))
            .ok_or_else(|| WorkflowError::InvalidActivity(s.trim().to_string()))
    }
}

impl Serialize for ActivityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of the `suivi` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: RecordId,
    #[serde(rename = "enfant", default, skip_serializing_if = "Option::is_none")]
    pub child: Option<ChildId>,
    pub date: NaiveDate,
    #[serde(rename = "heure")]
    pub time: ClockTime,
    #[serde(rename = "activite")]
    pub activity: ActivityType,
    #[serde(default)]
    pub observation: Option<String>,
}

pub struct ActivityLog<S: RecordStore> {
    store: S,
    addressing: Addressing,
    notifier: Notifier,
}

impl<S: RecordStore> ActivityLog<S> {
    pub fn new(store: S, addressing: Addressing) -> Self {
        Self {
            store,
            addressing,
            notifier: Notifier::default(),
        }
    }

    pub fn with_hook(mut self, hook: ChangeHook) -> Self {
        self.notifier.set(hook);
        self
    }

    pub async fn add_activity(
        &self,
        child: &str,
        date: &str,
        time: &str,
        activity: &str,
        observation: Option<&str>,
    ) -> WorkflowResult<ActivityRecord> {
        let child = parse_child(child)?;
        let date = parse_date(date)?;
        let time = parse_clock(TIME_COLUMN, time)?;
        if activity.trim().is_empty() {
            return Err(WorkflowError::MissingField(ACTIVITY_COLUMN));
        }
        let activity: ActivityType = activity.parse()?;

        let collection = self.addressing.resolve(RecordKind::Activity, &child);
        let mut row = collection.row();
        row.insert("date".to_string(), Value::from(date.to_string()));
        row.insert(TIME_COLUMN.to_string(), Value::from(time.to_string()));
        row.insert(ACTIVITY_COLUMN.to_string(), Value::from(activity.label()));
        row.insert(
            OBSERVATION_COLUMN.to_string(),
            optional_text(observation).map(Value::from).unwrap_or(Value::Null),
        );

        let record: ActivityRecord = decode(self.store.insert(&collection, row).await?)?;
        self.notifier.emit(Change {
            kind: RecordKind::Activity,
            action: ChangeAction::Inserted,
            child,
            id: record.id.clone(),
        });

        Ok(record)
    }

    /// Deletes an entry after `confirm` agrees. Returns whether it was deleted.
    pub async fn delete_activity(&self, child: &str, id: &RecordId, confirm: impl FnOnce() -> bool) -> WorkflowResult<bool> {
        let child = parse_child(child)?;
        if !confirm() {
            return Ok(false);
        }
        let collection = self.addressing.resolve(RecordKind::Activity, &child);
        self.store.delete(&collection, id).await?;

        self.notifier.emit(Change {
            kind: RecordKind::Activity,
            action: ChangeAction::Deleted,
            child,
            id: id.clone(),
        });
        Ok(true)
    }

    pub async fn list_activities(&self, child: &ChildId, date: NaiveDate) -> WorkflowResult<Vec<ActivityRecord>> {
        list_activities(&self.store, self.addressing, child, date).await
    }
}

/// Entries of a child on a date, latest first.
pub async fn list_activities<S: RecordStore>(
    store: &S,
    addressing: Addressing,
    child: &ChildId,
    date: NaiveDate,
) -> WorkflowResult<Vec<ActivityRecord>> {
    let collection = addressing.resolve(RecordKind::Activity, child);
    let query = collection
        .query()
        .eq("date", date.to_string())
        .order_by(TIME_COLUMN, Direction::Descending);

    store
        .find(&collection, &query)
        .await?
        .into_iter()
        .map(|row| decode(row).map_err(WorkflowError::from))
        .collect()
}
