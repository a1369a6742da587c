//! Snapshot broadcast between a store and its observers.
//!
//! # Responsibility
//! - Fan each post-mutation snapshot out to every live subscription.
//! - Keep the publishing side non-blocking regardless of subscriber speed.
//!
//! # Invariants
//! - No replay: a subscription only sees snapshots published after it was
//!   created.
//! - Each subscription sees a given snapshot at most once, in publish order.
//! - A subscription that falls more than `capacity` snapshots behind skips the
//!   oldest ones and resumes at the oldest still retained.
//! - Dropping a `Subscription` unsubscribes it.

use log::warn;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Immutable collection state after a mutation.
#[derive(Debug, PartialEq, Eq)]
pub struct Snapshot<T> {
    version: u64,
    items: T,
}

impl<T> Snapshot<T> {
    pub fn new(version: u64, items: T) -> Self {
        Self { version, items }
    }

    /// Mutation counter; 0 is the state the store was opened with.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn items(&self) -> &T {
        &self.items
    }
}

pub type SharedSnapshot<T> = Arc<Snapshot<T>>;

/// Sending half of the channel, owned by the store.
pub struct Notifier<T> {
    sender: broadcast::Sender<SharedSnapshot<T>>,
    topic: String,
}

impl<T: Send + Sync + 'static> Notifier<T> {
    /// Creates a notifier retaining at most `capacity` undelivered snapshots
    /// per subscriber. A zero capacity is raised to one.
    pub fn new(topic: impl Into<String>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            topic: topic.into(),
        }
    }

    /// Registers a new observer. It receives only future snapshots.
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            receiver: self.sender.subscribe(),
            topic: self.topic.clone(),
        }
    }

    /// Queues `snapshot` for every live subscription.
    ///
    /// Returns how many subscriptions it was queued for.
    pub fn publish(&self, snapshot: SharedSnapshot<T>) -> usize {
        // `send` only fails when nobody is subscribed.
        self.sender.send(snapshot).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving handle for one observer.
pub struct Subscription<T> {
    receiver: broadcast::Receiver<SharedSnapshot<T>>,
    topic: String,
}

impl<T: Send + Sync + 'static> Subscription<T> {
    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the store has been dropped and every queued
    /// snapshot was consumed.
    pub async fn recv(&mut self) -> Option<SharedSnapshot<T>> {
        loop {
            match self.receiver.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(RecvError::Lagged(skipped)) => self.report_lag(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next queued snapshot without waiting.
    pub fn try_next(&mut self) -> Option<SharedSnapshot<T>> {
        loop {
            match self.receiver.try_recv() {
                Ok(snapshot) => return Some(snapshot),
                Err(TryRecvError::Lagged(skipped)) => self.report_lag(skipped),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Takes every queued snapshot, oldest first.
    pub fn drain(&mut self) -> Vec<SharedSnapshot<T>> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Skips everything queued and returns only the newest snapshot, if any.
    pub fn latest(&mut self) -> Option<SharedSnapshot<T>> {
        std::iter::from_fn(|| self.try_next()).last()
    }

    fn report_lag(&self, skipped: u64) {
        warn!(
            "event=subscriber_lagged module=notify status=degraded topic={} skipped={skipped}",
            self.topic
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{Notifier, Snapshot};
    use std::sync::Arc;

    fn snapshot(version: u64) -> Arc<Snapshot<u64>> {
        Arc::new(Snapshot::new(version, version * 10))
    }

    #[test]
    fn subscriber_sees_only_later_snapshots() {
        let notifier = Notifier::new("test", 8);
        notifier.publish(snapshot(1));

        let mut late = notifier.subscribe();
        assert!(late.try_next().is_none());

        notifier.publish(snapshot(2));
        let received = late.try_next().unwrap();
        assert_eq!(received.version(), 2);
        assert_eq!(*received.items(), 20);
        assert!(late.try_next().is_none());
    }

    #[test]
    fn publish_without_subscribers_is_not_an_error() {
        let notifier = Notifier::<u64>::new("test", 4);
        assert_eq!(notifier.publish(snapshot(1)), 0);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let notifier = Notifier::<u64>::new("test", 4);
        let first = notifier.subscribe();
        let _second = notifier.subscribe();
        assert_eq!(notifier.subscriber_count(), 2);

        drop(first);
        assert_eq!(notifier.subscriber_count(), 1);
        assert_eq!(notifier.publish(snapshot(1)), 1);
    }

    #[test]
    fn lagging_subscriber_skips_oldest_and_keeps_order() {
        let notifier = Notifier::new("test", 2);
        let mut slow = notifier.subscribe();
        for version in 1..=5 {
            notifier.publish(snapshot(version));
        }

        let versions: Vec<_> = slow.drain().iter().map(|s| s.version()).collect();
        assert_eq!(versions, vec![4, 5]);
    }

    #[test]
    fn latest_returns_newest_queued_snapshot() {
        let notifier = Notifier::new("test", 8);
        let mut sub = notifier.subscribe();
        for version in 1..=3 {
            notifier.publish(snapshot(version));
        }

        assert_eq!(sub.latest().unwrap().version(), 3);
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let notifier = Notifier::new("test", 0);
        let mut sub = notifier.subscribe();
        notifier.publish(snapshot(1));
        assert_eq!(sub.try_next().unwrap().version(), 1);
    }
}
