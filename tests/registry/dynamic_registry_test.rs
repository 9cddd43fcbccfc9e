use std::sync::Arc;
use std::time::Duration;

use nsregistry::kv::MemStore;
use nsregistry::DynamicInitializer;
use nsregistry::Initializer;
use nsregistry::NamespaceMap;

use crate::common::*;

fn retention_days(map: &NamespaceMap) -> u64 {
    map.get("nsA").unwrap().options().retention.retention_period.as_secs() / DAY
}

#[tokio::test]
async fn test_registry_follows_remote_key() {
    let store = Arc::new(MemStore::new());
    store.set(KEY, document(&[("nsA", DAY)]));
    let (opts, metrics) = options(store.clone());

    let registry = DynamicInitializer::new(opts).init().await.ok().unwrap();
    let mut s1 = registry.watch().unwrap();
    assert_eq!(s1.next().await, Some(namespace_map(&[("nsA", DAY)])));

    // Same content, new version
    store.set(KEY, document(&[("nsA", DAY)]));
    eventually(|| invalid_updates(&metrics) == 1.0).await;
    assert!(!s1.has_pending());

    store.set(KEY, document(&[("nsA", 2 * DAY)]));
    let next = tokio::time::timeout(WAIT, s1.next()).await.unwrap();
    assert_eq!(next, Some(namespace_map(&[("nsA", 2 * DAY)])));

    // Replay of an older version
    store.set_with_version(KEY, 2, document(&[("nsA", 5 * DAY)]));
    eventually(|| invalid_updates(&metrics) == 2.0).await;
    assert!(!s1.has_pending());
    assert_eq!(registry.version(), Some(3));

    registry.close().unwrap();
    assert_eq!(tokio::time::timeout(WAIT, s1.next()).await.unwrap(), None);
    assert!(registry.watch().unwrap_err().is_closed());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_subscribers_observe_increasing_versions() {
    const UPDATES: u64 = 20;

    let store = Arc::new(MemStore::new());
    store.set(KEY, document(&[("nsA", DAY)]));
    let (opts, metrics) = options(store.clone());
    let registry = DynamicInitializer::new(opts).init().await.ok().unwrap();

    let mut consumers = Vec::new();
    for _ in 0..8 {
        let mut watch = registry.watch().unwrap();
        consumers.push(tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(map) = watch.next().await {
                let days = retention_days(&map);
                seen.push(days);
                if days == UPDATES {
                    break;
                }
            }
            seen
        }));
    }

    for days in 2..=UPDATES {
        store.set(KEY, document(&[("nsA", days * DAY)]));
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    for consumer in consumers {
        let seen = tokio::time::timeout(WAIT, consumer).await.unwrap().unwrap();
        assert!(seen.windows(2).all(|w| w[0] < w[1]), "out of order delivery: {seen:?}");
        assert_eq!(seen.last(), Some(&UPDATES));
    }
    assert_eq!(invalid_updates(&metrics), 0.0);
    registry.close().unwrap();
}

#[tokio::test]
async fn test_init_fails_fast_on_missing_key() {
    let store = Arc::new(MemStore::new());
    let (opts, _) = options(store);

    let err = match DynamicInitializer::new(opts.with_init_timeout(Duration::from_millis(20)))
        .init()
        .await
    {
        Ok(_) => panic!("init should time out"),
        Err(e) => e,
    };

    assert!(err.is_init_timeout());
    assert_eq!(err.to_string(), "timed out waiting for initial value after 20ms");
}
