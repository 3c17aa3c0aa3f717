//! Clients for the hosted backend.
//!
//! The hosted backend is a PostgREST service in front of the same tables the
//! local database holds. [`rest::RestStore`] speaks its dialect and implements
//! [`crate::store::RecordStore`], so the workflows run unchanged against it.

pub mod rest;

pub use rest::{RestConfig, RestStore};
