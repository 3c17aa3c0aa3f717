//! Workflows and supporting utilities.
//!
//! - [`attendance`]: two-step arrival and departure capture
//! - [`activity`]: activity log
//! - [`profile`]: user roles and child assignment
//! - [`dashboard`]: caregiver and parent day views
//! - [`photo`]: photo metadata listing
//! - [`config`], [`data_storage`], [`pending`]: local files
//! - [`messages`], [`view`], [`formatter`]: terminal output

pub mod activity;
pub mod attendance;
pub mod config;
pub mod dashboard;
pub mod data_storage;
pub mod duration;
pub mod error;
pub mod fields;
pub mod formatter;
pub mod messages;
pub mod notify;
pub mod pending;
pub mod photo;
pub mod profile;
pub mod view;
