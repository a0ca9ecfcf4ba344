//! Request handlers, one submodule per resource.
//!
//! Handlers validate input, enforce role and ownership checks, delegate to
//! the repositories in `pms_db` and the rules in `pms_core`, and map errors
//! via [`AppError`](crate::error::AppError).

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod comment;
pub mod currency;
pub mod customer;
pub mod customer_settlement;
pub mod document;
pub mod enquiry;
pub mod holiday;
pub mod notification;
pub mod outsource_team;
pub mod project;
pub mod settlement;
pub mod task;
pub mod time_off;
pub mod time_sheet;
pub mod todo;
