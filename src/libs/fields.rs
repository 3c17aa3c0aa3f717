//! Validation of raw form values into typed fields.

use crate::libs::duration::ClockTime;
use crate::libs::error::{WorkflowError, WorkflowResult};
use crate::store::{ChildId, CHILD_COLUMN};
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn required<'a>(field: &'static str, raw: &'a str) -> WorkflowResult<&'a str> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(WorkflowError::MissingField(field));
    }
    Ok(value)
}

fn invalid(field: &'static str, raw: &str) -> WorkflowError {
    WorkflowError::InvalidField {
        field,
        value: raw.to_string(),
    }
}

pub fn parse_child(raw: &str) -> WorkflowResult<ChildId> {
    let value = required(CHILD_COLUMN, raw)?;
    ChildId::parse(value).map_err(|_| invalid(CHILD_COLUMN, raw))
}

pub fn parse_date(raw: &str) -> WorkflowResult<NaiveDate> {
    let value = required("date", raw)?;
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid("date", raw))
}

pub fn parse_clock(field: &'static str, raw: &str) -> WorkflowResult<ClockTime> {
    let value = required(field, raw)?;
    ClockTime::parse(value).ok_or_else(|| invalid(field, raw))
}

/// Blank text becomes `None`.
pub fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|text| !text.is_empty()).map(str::to_string)
}
