use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::TimelineEvent;

/// Best-effort side-channel for activity-feed consumers.
///
/// Channels are created lazily per subject. Publishing never blocks the
/// caller and delivery is at-most-once: an event emitted with no
/// subscribers is simply dropped.
#[derive(Debug, Clone)]
pub struct TimelineBus {
    /// Subject-specific event channels: subject_id -> sender
    subject_channels: Arc<RwLock<HashMap<String, broadcast::Sender<TimelineEvent>>>>,
}

impl TimelineBus {
    pub fn new() -> Self {
        Self {
            subject_channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Emits an event to all subscribers of the event's subject timeline
    pub async fn emit(&self, event: TimelineEvent) {
        let subject_id = event.subject_id().to_string();
        let subject_channels = self.subject_channels.read().await;

        if let Some(sender) = subject_channels.get(&subject_id) {
            match sender.send(event) {
                Ok(receiver_count) => {
                    debug!(
                        subject_id = %subject_id,
                        receivers = receiver_count,
                        "Timeline event emitted"
                    );
                }
                Err(_) => {
                    debug!(subject_id = %subject_id, "Timeline event emitted with no receivers");
                }
            }
        } else {
            debug!(subject_id = %subject_id, "No timeline channel found - creating one");
            drop(subject_channels);

            let mut subject_channels = self.subject_channels.write().await;
            let (sender, _) = broadcast::channel(100);
            subject_channels.insert(subject_id.clone(), sender.clone());

            if sender.send(event).is_err() {
                debug!(subject_id = %subject_id, "Timeline event sent to new channel with no receivers");
            }
        }
    }

    /// Subscribe to the timeline of a specific subject
    pub async fn subscribe(&self, subject_id: &str) -> broadcast::Receiver<TimelineEvent> {
        let subject_channels = self.subject_channels.read().await;

        if let Some(sender) = subject_channels.get(subject_id) {
            sender.subscribe()
        } else {
            debug!(subject_id = %subject_id, "Creating new timeline channel for subscription");
            drop(subject_channels);

            let mut subject_channels = self.subject_channels.write().await;
            let (sender, _) = broadcast::channel(100);
            let receiver = sender.subscribe();
            subject_channels.insert(subject_id.to_string(), sender);
            receiver
        }
    }
}

impl Default for TimelineBus {
    fn default() -> Self {
        Self::new()
    }
}
