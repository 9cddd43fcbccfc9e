use crate::broadcast::Subscription;
use crate::NamespaceMap;

/// Live view on the namespace maps published by a registry.
///
/// Yields the map current at subscription time first, then every map
/// published afterwards. A consumer that falls behind skips straight to the
/// latest map. Dropping the watch unsubscribes it.
#[derive(Debug)]
pub struct NamespaceWatch {
    subscription: Subscription<NamespaceMap>,
}

impl NamespaceWatch {
    pub(crate) fn new(subscription: Subscription<NamespaceMap>) -> Self {
        Self { subscription }
    }

    /// Waits for the next map. `None` once the registry is closed.
    pub async fn next(&mut self) -> Option<NamespaceMap> {
        self.subscription.next().await
    }

    /// Most recent map held for this watch, without waiting or marking it seen.
    pub fn get(&self) -> Option<NamespaceMap> {
        self.subscription.get()
    }

    /// Whether `next` would return without waiting.
    pub fn has_pending(&self) -> bool {
        self.subscription.has_pending()
    }

    /// Stops watching.
    pub fn close(self) {}
}
