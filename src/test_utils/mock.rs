//! Mocked config service components built with [mockall].
//!
//! Used where the in-process store cannot reproduce a failure: a client that
//! cannot reach its store, a store refusing a watch, or a watch that never
//! signals.
//!
//! [mockall]: https://docs.rs/mockall/latest/mockall/

use std::sync::Arc;

use crate::kv::MockConfigServiceClient;
use crate::kv::MockStore;
use crate::kv::MockValueWatch;
use crate::kv::Store;
use crate::kv::Value;
use crate::kv::ValueWatch;
use crate::KvError;

/// Client whose `kv()` always fails.
pub fn unreachable_client() -> MockConfigServiceClient {
    let mut client = MockConfigServiceClient::new();
    client
        .expect_kv()
        .returning(|| Err(KvError::StoreUnavailable("connection refused".to_string()).into()));
    client
}

/// Client serving `store`.
pub fn client_with_store(store: MockStore) -> MockConfigServiceClient {
    let store: Arc<dyn Store> = Arc::new(store);
    let mut client = MockConfigServiceClient::new();
    client.expect_kv().returning(move || Ok(store.clone()));
    client
}

/// Store refusing every watch.
pub fn failing_watch_store() -> MockStore {
    let mut store = MockStore::new();
    store.expect_watch().returning(|key| {
        Err(KvError::WatchFailed {
            key: key.to_string(),
            reason: "permission denied".to_string(),
        }
        .into())
    });
    store
}

/// Store handing out `watch` for every key.
pub fn store_with_watch(watch: MockValueWatch) -> MockStore {
    let watch: Arc<dyn ValueWatch> = Arc::new(watch);
    let mut store = MockStore::new();
    store.expect_watch().returning(move |_| Ok(watch.clone()));
    store
}

/// Watch that signals once, exposes `value`, then ends its stream.
pub fn single_value_watch(value: Option<Value>) -> MockValueWatch {
    let mut watch = MockValueWatch::new();
    let mut signalled = false;
    watch.expect_changed().returning(move || {
        let first = !signalled;
        signalled = true;
        first
    });
    watch.expect_get().returning(move || value.clone());
    watch.expect_close().returning(|| ());
    watch
}
