//! Notification dispatcher.
//!
//! [`NotificationDispatcher`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes one `notifications` row per recipient of every event. It runs
//! as a long-lived background task and stops when the bus is dropped.

use pms_db::models::notification::CreateNotification;
use pms_db::repositories::NotificationRepo;
use pms_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::DomainEvent;

pub struct NotificationDispatcher;

impl NotificationDispatcher {
    /// Run the dispatch loop until the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::dispatch(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to write notifications"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Write the notifications for one event. Returns how many were created.
    pub async fn dispatch(pool: &DbPool, event: &DomainEvent) -> Result<usize, sqlx::Error> {
        let targets = event.notify_targets();
        for user_id in &targets {
            let input = CreateNotification {
                user_id: *user_id,
                event_type: event.event_type.clone(),
                content: event.message.clone(),
                url: event.url.clone(),
            };
            NotificationRepo::create(pool, &input).await?;
        }
        tracing::debug!(
            event_type = %event.event_type,
            recipients = targets.len(),
            "Notifications dispatched"
        );
        Ok(targets.len())
    }
}
