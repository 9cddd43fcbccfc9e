use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::BroadcastError;

/// Publisher side of the broadcast.
///
/// Cloning yields another handle on the same hub.
#[derive(Debug)]
pub struct BroadcastHub<T> {
    inner: Arc<HubInner<T>>,
}

impl<T> Clone for BroadcastHub<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[derive(Debug)]
struct HubState<T> {
    closed: bool,
    latest: Option<T>,
}

#[derive(Debug)]
struct HubInner<T> {
    /// Serializes update, subscribe and close
    state: Mutex<HubState<T>>,

    /// Per-subscription single-value slots
    subscribers: DashMap<u64, watch::Sender<Option<T>>>,

    /// Next subscription ID (monotonically increasing)
    next_id: AtomicU64,
}

impl<T> Default for BroadcastHub<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BroadcastHub<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a hub without a current value.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                state: Mutex::new(HubState {
                    closed: false,
                    latest: None,
                }),
                subscribers: DashMap::new(),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Creates a hub seeded with `value`.
    pub fn with_value(value: T) -> Self {
        let hub = Self::new();
        hub.inner.state.lock().latest = Some(value);
        hub
    }

    /// Publishes `value` to every current and future subscription.
    ///
    /// Never waits on consumers: each subscription's slot is overwritten.
    pub fn update(
        &self,
        value: T,
    ) -> Result<(), BroadcastError> {
        let mut state = self.inner.state.lock();
        if state.closed {
            return Err(BroadcastError::Closed);
        }

        for slot in self.inner.subscribers.iter() {
            slot.value().send_replace(Some(value.clone()));
        }
        state.latest = Some(value);

        trace!(subscribers = self.inner.subscribers.len(), "broadcast update published");
        Ok(())
    }

    /// Registers a new consumer.
    ///
    /// The returned subscription yields the current value first, if the hub
    /// holds one.
    pub fn subscribe(&self) -> Result<Subscription<T>, BroadcastError> {
        let state = self.inner.state.lock();
        if state.closed {
            return Err(BroadcastError::Closed);
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, mut receiver) = watch::channel(state.latest.clone());
        if state.latest.is_some() {
            receiver.mark_changed();
        }
        self.inner.subscribers.insert(id, sender);
        drop(state);

        trace!(subscription_id = id, "subscription registered");
        Ok(Subscription {
            id,
            receiver,
            hub: self.inner.clone(),
        })
    }

    /// Most recently published value.
    pub fn get(&self) -> Option<T> {
        self.inner.state.lock().latest.clone()
    }

    /// Releases every subscription and rejects further use.
    pub fn close(&self) -> Result<(), BroadcastError> {
        let mut state = self.inner.state.lock();
        if state.closed {
            return Err(BroadcastError::Closed);
        }
        state.closed = true;

        // Dropping the senders ends every subscription stream.
        let released = self.inner.subscribers.len();
        self.inner.subscribers.clear();

        debug!(released, "broadcast hub closed");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

/// Consumer side of the broadcast.
///
/// Unregisters from the hub when dropped.
#[derive(Debug)]
pub struct Subscription<T> {
    id: u64,
    receiver: watch::Receiver<Option<T>>,
    hub: Arc<HubInner<T>>,
}

impl<T> Subscription<T>
where
    T: Clone,
{
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Waits for the next value this subscription has not seen yet.
    ///
    /// Returns `None` once the hub is closed and nothing is pending.
    pub async fn next(&mut self) -> Option<T> {
        loop {
            if self.receiver.changed().await.is_err() {
                return None;
            }
            if let Some(value) = self.receiver.borrow_and_update().clone() {
                return Some(value);
            }
        }
    }

    /// Latest value delivered to this subscription, without waiting.
    pub fn get(&self) -> Option<T> {
        self.receiver.borrow().clone()
    }

    /// Whether a value is pending that [`Subscription::next`] would return
    /// without waiting. Always `false` once the hub is closed.
    pub fn has_pending(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.hub.subscribers.remove(&self.id);
        trace!(subscription_id = self.id, "subscription unregistered");
    }
}
