//! Event bus and notification fan-out.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`]: the envelope handlers publish after a mutation.
//! - [`NotificationDispatcher`]: background loop that turns events into
//!   per-recipient rows in the `notifications` table.

pub mod bus;
pub mod dispatcher;

pub use bus::{DomainEvent, EventBus};
pub use dispatcher::NotificationDispatcher;

/// Event type names published by the API.
pub mod event_types {
    pub const TASK_ASSIGNED: &str = "task.assigned";
    pub const ENQUIRY_CONVERTED: &str = "enquiry.converted";
    pub const TIME_OFF_REQUESTED: &str = "time_off.requested";
    pub const TIME_OFF_DECIDED: &str = "time_off.decided";
}
