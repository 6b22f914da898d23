/**
 * Real-time Event Broadcasting
 *
 * Change notifications are delivered per user: every user with an open
 * subscription has a `tokio::sync::broadcast` channel, created on demand.
 * Handlers publish to the users a change concerns (the snippet owner, the
 * members of a group, the invitee) and never to anyone else.
 *
 * Channels with no receivers are dropped by a periodic cleanup task.
 */

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::shared::RealtimeEvent;

const CHANNEL_CAPACITY: usize = 256;

/// Per-user broadcast channels
#[derive(Debug, Clone, Default)]
pub struct RealtimeHub {
    channels: Arc<Mutex<HashMap<Uuid, broadcast::Sender<RealtimeEvent>>>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a user's channel, creating it if needed
    pub fn subscribe(&self, user_id: Uuid) -> broadcast::Receiver<RealtimeEvent> {
        let mut channels = self.channels.lock();
        channels
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Send an event to one user; returns the number of receivers reached
    pub fn publish(&self, user_id: Uuid, event: RealtimeEvent) -> usize {
        let sender = self.channels.lock().get(&user_id).cloned();
        match sender {
            Some(sender) => match sender.send(event) {
                Ok(count) => {
                    tracing::debug!("[Realtime] event delivered to {} receivers of {}", count, user_id);
                    count
                }
                Err(_) => 0,
            },
            None => 0,
        }
    }

    /// Send the same event to several users
    pub fn publish_many<I>(&self, user_ids: I, event: &RealtimeEvent) -> usize
    where
        I: IntoIterator<Item = Uuid>,
    {
        user_ids
            .into_iter()
            .map(|user_id| self.publish(user_id, event.clone()))
            .sum()
    }

    /// Drop channels nobody listens to
    pub fn cleanup_inactive_channels(&self) -> usize {
        let mut channels = self.channels.lock();
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }

    pub fn subscriber_count(&self, user_id: Uuid) -> usize {
        self.channels
            .lock()
            .get(&user_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.lock().len()
    }
}
