//! Day views for caregivers and parents.
//!
//! Each section is fetched on its own. A section that fails to load becomes
//! an empty [`Listing`] carrying the error, and the others still render.
//! Views are plain query results: callers build a new one after every write.

use crate::libs::activity::{list_activities, ActivityRecord};
use crate::libs::attendance::{list_attendance, AttendanceRecord};
use crate::libs::error::{WorkflowError, WorkflowResult};
use crate::libs::photo::{list_photos, PhotoRecord};
use crate::libs::profile::{ChildProfile, Role};
use crate::store::{Addressing, ChildId, RecordStore};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub records: Vec<T>,
    pub error: Option<String>,
}

impl<T> Listing<T> {
    pub fn from_result(section: &str, result: WorkflowResult<Vec<T>>) -> Self {
        match result {
            Ok(records) => Self { records, error: None },
            Err(e) => {
                tracing::warn!(section, error = %e, "section failed to load");
                Self {
                    records: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayView {
    pub child: ChildId,
    pub date: NaiveDate,
    pub activities: Listing<ActivityRecord>,
    pub attendance: Listing<AttendanceRecord>,
    /// Only on parent views.
    pub photos: Option<Listing<PhotoRecord>>,
}

pub struct Dashboard<S: RecordStore> {
    store: S,
    addressing: Addressing,
}

impl<S: RecordStore> Dashboard<S> {
    pub fn new(store: S, addressing: Addressing) -> Self {
        Self { store, addressing }
    }

    pub async fn caregiver_day(&self, child: &ChildId, date: NaiveDate) -> DayView {
        let activities = list_activities(&self.store, self.addressing, child, date).await;
        let attendance = list_attendance(&self.store, self.addressing, child, date).await;

        DayView {
            child: child.clone(),
            date,
            activities: Listing::from_result("activities", activities),
            attendance: Listing::from_result("attendance", attendance),
            photos: None,
        }
    }

    /// Read-only view of the parent's own child.
    pub async fn parent_day(&self, profile: &ChildProfile, date: NaiveDate) -> WorkflowResult<DayView> {
        if profile.role != Role::Parent {
            return Err(WorkflowError::Forbidden(format!("{} is not a parent", profile.user_id)));
        }
        let child = profile.child.clone().ok_or(WorkflowError::MissingField("enfant"))?;
        profile.ensure_can_read(&child)?;

        let mut view = self.caregiver_day(&child, date).await;
        let photos = list_photos(&self.store, self.addressing, &child).await;
        view.photos = Some(Listing::from_result("photos", photos));

        Ok(view)
    }
}
