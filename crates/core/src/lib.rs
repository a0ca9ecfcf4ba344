//! Domain logic for the project management service.
//!
//! Nothing in this crate touches the database or HTTP; the db and api crates
//! feed it rows and render its results.

pub mod billing;
pub mod calendar;
pub mod enquiry;
pub mod error;
pub mod progress;
pub mod roles;
pub mod settlement;
pub mod status;
pub mod storage;
pub mod task_tree;
pub mod time_tracking;
pub mod types;
