//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts, validated with `validator`
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Nullable columns that a patch may clear use `Option<Option<T>>` with
//! [`nullable`]: an absent field keeps the value, `null` clears it.

pub mod attendance;
pub mod comment;
pub mod currency;
pub mod customer;
pub mod document;
pub mod enquiry;
pub mod holiday;
pub mod notification;
pub mod outsource_team;
pub mod project;
pub mod session;
pub mod settlement;
pub mod task;
pub mod time_off;
pub mod time_sheet;
pub mod todo;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Deserialize a present field (including `null`) as `Some(..)`.
///
/// Pair with `#[serde(default)]` so an absent field stays `None`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
