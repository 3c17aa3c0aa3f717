//! Photo metadata. Files live in external blob storage; only rows are read here.

use crate::libs::error::{WorkflowError, WorkflowResult};
use crate::store::{decode, Addressing, ChildId, Direction, RecordId, RecordKind, RecordStore};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: RecordId,
    #[serde(rename = "enfant", default, skip_serializing_if = "Option::is_none")]
    pub child: Option<ChildId>,
    pub date: NaiveDate,
    pub url: String,
}

/// Every photo of a child, newest first.
pub async fn list_photos<S: RecordStore>(store: &S, addressing: Addressing, child: &ChildId) -> WorkflowResult<Vec<PhotoRecord>> {
    let collection = addressing.resolve(RecordKind::Photo, child);
    let query = collection.query().order_by("date", Direction::Descending);

    store
        .find(&collection, &query)
        .await?
        .into_iter()
        .map(|row| decode(row).map_err(WorkflowError::from))
        .collect()
}
