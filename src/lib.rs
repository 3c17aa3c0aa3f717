//! # Nounou - childcare attendance and activity tracker
//!
//! Caregivers record when a child arrives and leaves, log meals, naps and
//! care, and parents get a read-only view of their own child's day.
//!
//! ## Features
//!
//! - **Attendance**: two-step arrival/departure capture with duration and
//!   duplicate-arrival detection
//! - **Activity log**: fixed set of daily and care activities with observations
//! - **Dashboards**: caregiver and parent day views that degrade per section
//! - **Storage**: local SQLite database or a hosted PostgREST backend, with
//!   shared or per-child table layouts
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nounou::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod db;
pub mod libs;
pub mod store;
