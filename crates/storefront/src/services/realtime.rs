//! Per-user realtime channels for profile changes.
//!
//! The hub keeps one broadcast channel per user that currently has a
//! listener. A [`ProfileSubscription`] follows exactly one user at a time;
//! switching users releases the old receiver before attaching the new one,
//! and channels without receivers are pruned.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use bramble_core::UserId;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::models::ProfileChange;

/// Messages buffered per user before slow receivers start lagging.
const CHANNEL_CAPACITY: usize = 16;

type Channels = HashMap<UserId, broadcast::Sender<ProfileChange>>;

/// Registry of per-user profile channels.
#[derive(Clone, Default)]
pub struct ProfileHub {
    channels: Arc<RwLock<Channels>>,
}

impl ProfileHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Send a change to everyone subscribed to its user.
    ///
    /// Returns how many receivers got it. No channel is created when nobody
    /// is listening.
    pub fn publish(&self, change: ProfileChange) -> usize {
        let channels = self
            .channels
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        channels
            .get(&change.user_id)
            .and_then(|sender| sender.send(change).ok())
            .unwrap_or(0)
    }

    /// Start following one user's changes.
    #[must_use]
    pub fn subscribe(&self, user_id: UserId) -> ProfileSubscription {
        ProfileSubscription {
            hub: self.clone(),
            user_id,
            receiver: Some(self.receiver_for(user_id)),
        }
    }

    /// Number of users with an open channel.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Receivers currently attached to a user's channel.
    #[must_use]
    pub fn subscriber_count(&self, user_id: UserId) -> usize {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    fn receiver_for(&self, user_id: UserId) -> broadcast::Receiver<ProfileChange> {
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        channels
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    fn prune(&self, user_id: UserId) {
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if channels
            .get(&user_id)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(&user_id);
            tracing::debug!(%user_id, "Pruned profile channel");
        }
    }
}

/// A live subscription to one user's profile changes.
///
/// Dropping it unsubscribes.
pub struct ProfileSubscription {
    hub: ProfileHub,
    user_id: UserId,
    receiver: Option<broadcast::Receiver<ProfileChange>>,
}

impl ProfileSubscription {
    /// The user currently followed.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Follow a different user, releasing the current channel first.
    pub fn switch_user(&mut self, user_id: UserId) {
        if user_id == self.user_id {
            return;
        }

        drop(self.receiver.take());
        self.hub.prune(self.user_id);

        self.user_id = user_id;
        self.receiver = Some(self.hub.receiver_for(user_id));
    }

    /// Track whoever the session belongs to now.
    ///
    /// Returns `false` when nobody is signed in and the subscription should
    /// be dropped.
    pub fn follow(&mut self, user_id: Option<UserId>) -> bool {
        match user_id {
            Some(user_id) => {
                self.switch_user(user_id);
                true
            }
            None => false,
        }
    }

    /// Wait for the next change.
    ///
    /// Skips messages lost to lag. Returns `None` once the channel closes.
    pub async fn recv(&mut self) -> Option<ProfileChange> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(change) => return Some(change),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(user_id = %self.user_id, skipped, "Profile subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for ProfileSubscription {
    fn drop(&mut self) {
        drop(self.receiver.take());
        self.hub.prune(self.user_id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::Profile;

    fn change(user_id: UserId, name: &str) -> ProfileChange {
        ProfileChange::from(Profile {
            user_id,
            display_name: Some(name.to_string()),
            avatar_url: None,
            updated_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let hub = ProfileHub::new();
        let user = UserId::new(Uuid::new_v4());
        let mut subscription = hub.subscribe(user);

        assert_eq!(hub.publish(change(user, "Ada")), 1);

        let received = subscription.recv().await.unwrap();
        assert_eq!(received.profile.display_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_publish_without_listeners_creates_nothing() {
        let hub = ProfileHub::new();
        let user = UserId::new(Uuid::new_v4());

        assert_eq!(hub.publish(change(user, "Ada")), 0);
        assert_eq!(hub.channel_count(), 0);
    }

    #[tokio::test]
    async fn test_switch_user_unsubscribes_previous_channel() {
        let hub = ProfileHub::new();
        let first = UserId::new(Uuid::new_v4());
        let second = UserId::new(Uuid::new_v4());
        let mut subscription = hub.subscribe(first);

        subscription.switch_user(second);

        assert_eq!(subscription.user_id(), second);
        assert_eq!(hub.subscriber_count(first), 0);
        assert_eq!(hub.subscriber_count(second), 1);
        assert_eq!(hub.channel_count(), 1);
        assert_eq!(hub.publish(change(first, "old")), 0);

        hub.publish(change(second, "new"));
        let received = subscription.recv().await.unwrap();
        assert_eq!(received.user_id, second);
    }

    #[tokio::test]
    async fn test_follow_moves_to_new_user_and_stops_on_sign_out() {
        let hub = ProfileHub::new();
        let first = UserId::new(Uuid::new_v4());
        let second = UserId::new(Uuid::new_v4());
        let mut subscription = hub.subscribe(first);

        assert!(subscription.follow(Some(first)));
        assert_eq!(hub.subscriber_count(first), 1);

        assert!(subscription.follow(Some(second)));
        assert_eq!(hub.publish(change(first, "stale")), 0);
        assert_eq!(hub.publish(change(second, "fresh")), 1);
        assert_eq!(subscription.recv().await.unwrap().user_id, second);

        assert!(!subscription.follow(None));
        drop(subscription);
        assert_eq!(hub.channel_count(), 0);
    }

    #[test]
    fn test_drop_prunes_channel_but_keeps_shared_one() {
        let hub = ProfileHub::new();
        let user = UserId::new(Uuid::new_v4());
        let a = hub.subscribe(user);
        let b = hub.subscribe(user);

        drop(a);
        assert_eq!(hub.subscriber_count(user), 1);
        assert_eq!(hub.channel_count(), 1);

        drop(b);
        assert_eq!(hub.channel_count(), 0);
    }
}
