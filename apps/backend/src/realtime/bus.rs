//! Publish/subscribe registry keyed by game and agent.
//!
//! Wake-ups are hints: a waiter always re-reads state after waking (or
//! after its segment elapses), so a lost publish only costs latency.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Notify;
use tracing::trace;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Game(i64),
    Agent(i64),
}

#[derive(Default)]
pub struct NotificationBus {
    topics: DashMap<Topic, DashMap<Uuid, Arc<Notify>>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one wait handle on every topic in `topics`.
    pub fn subscribe(self: &Arc<Self>, topics: &[Topic]) -> Subscription {
        let token = Uuid::new_v4();
        let notify = Arc::new(Notify::new());
        for topic in topics {
            self.topics
                .entry(*topic)
                .or_default()
                .insert(token, Arc::clone(&notify));
        }
        Subscription {
            bus: Arc::clone(self),
            topics: topics.to_vec(),
            token,
            notify,
        }
    }

    pub fn publish(&self, topic: Topic) {
        if let Some(subscribers) = self.topics.get(&topic) {
            trace!(?topic, subscribers = subscribers.len(), "publish");
            for entry in subscribers.iter() {
                // notify_one stores a permit when nobody is parked yet, so a
                // publish between subscribe and wait is not lost.
                entry.value().notify_one();
            }
        }
    }

    pub fn publish_all(&self, topics: &[Topic]) {
        for topic in topics {
            self.publish(*topic);
        }
    }

    /// Wakes game watchers and both seated agents.
    pub fn publish_game(&self, game_id: i64, players: [i64; 2]) {
        self.publish_all(&[
            Topic::Game(game_id),
            Topic::Agent(players[0]),
            Topic::Agent(players[1]),
        ]);
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topics.get(&topic).map_or(0, |subs| subs.len())
    }

    fn unregister(&self, topic: Topic, token: Uuid) {
        if let Some(subscribers) = self.topics.get(&topic) {
            subscribers.remove(&token);
        }
        self.topics.remove_if(&topic, |_, subs| subs.is_empty());
    }
}

/// Registered wait handle. Dropping it unregisters from every topic,
/// including when the waiting request is cancelled mid-segment.
pub struct Subscription {
    bus: Arc<NotificationBus>,
    topics: Vec<Topic>,
    token: Uuid,
    notify: Arc<Notify>,
}

impl Subscription {
    /// Waits for one publish or until `segment` elapses; true if woken.
    pub async fn wait(&self, segment: Duration) -> bool {
        tokio::time::timeout(segment, self.notify.notified())
            .await
            .is_ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        for topic in &self.topics {
            self.bus.unregister(*topic, self.token);
        }
    }
}
