//! Errors reported by the attendance, activity and profile workflows.
//!
//! Every variant is terminal for the current attempt: nothing is retried and
//! the caller shows the message and lets the user resubmit.

use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid {field}: '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("unknown activity type: '{0}'")]
    InvalidActivity(String),

    #[error("arrival at {arrival} already exists for {child} on {date}")]
    DuplicateEntry { child: String, date: String, arrival: String },

    #[error("no pending arrival to complete")]
    RecordNotFound,

    #[error("departure {departure} is earlier than arrival {arrival}")]
    InvalidDeparture { arrival: String, departure: String },

    #[error("a submission is already in progress")]
    Busy,

    #[error("record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("no profile for user '{0}'")]
    ProfileNotFound(String),

    #[error("not allowed: {0}")]
    Forbidden(String),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

impl From<StoreError> for WorkflowError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::InvalidName(name) => WorkflowError::InvalidField {
                field: "name",
                value: name,
            },
            StoreError::NotFound { .. } => WorkflowError::RecordNotFound,
            StoreError::Conflict(message) | StoreError::Unavailable(message) | StoreError::Decode(message) => {
                WorkflowError::StoreUnavailable(message)
            }
        }
    }
}
