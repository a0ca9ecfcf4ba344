//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` in the API state. Publishing
//! never blocks the request path; delivery happens in subscribers.

use chrono::{DateTime, Utc};
use pms_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// Something that happened which users should hear about.
///
/// Built with [`DomainEvent::new`] and the `with_*` methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated name, e.g. `"task.assigned"`.
    pub event_type: String,

    /// Entity kind and id the event is about, e.g. `("task", 12)`.
    pub source: Option<(String, DbId)>,

    /// User who caused the event.
    pub actor: Option<DbId>,

    /// Users to notify. The actor is skipped by the dispatcher.
    pub recipients: Vec<DbId>,

    /// Human-readable notification text.
    pub message: String,

    /// In-app link for the notification.
    pub url: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(event_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source: None,
            actor: None,
            recipients: Vec::new(),
            message: message.into(),
            url: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source = Some((entity_type.into(), entity_id));
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor = Some(user_id);
        self
    }

    pub fn with_recipients(mut self, recipients: impl IntoIterator<Item = DbId>) -> Self {
        self.recipients.extend(recipients);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Recipients to notify: deduplicated, in first-seen order, without the actor.
    pub fn notify_targets(&self) -> Vec<DbId> {
        let mut targets = Vec::with_capacity(self.recipients.len());
        for id in &self.recipients {
            if Some(*id) != self.actor && !targets.contains(id) {
                targets.push(*id);
            }
        }
        targets
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use pms_events::bus::{DomainEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(DomainEvent::new("task.assigned", "You were assigned a task"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unread events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped silently when there are none.
    pub fn publish(&self, event: DomainEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
