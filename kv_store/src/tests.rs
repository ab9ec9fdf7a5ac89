use std::{
    sync::{Arc, Mutex},
    thread,
    time::{Duration, Instant},
};

use bytes::Bytes;

use crate::*;

#[test]
fn test_memory_store_put_get_remove() {
    let store = MemoryStore::new();
    assert!(store.is_empty().unwrap());

    store.put("a", Bytes::from_static(b"1")).unwrap();
    store.put("a", Bytes::from_static(b"2")).unwrap();
    assert_eq!(store.get("a").unwrap(), Some(Bytes::from_static(b"2")));
    assert_eq!(store.len().unwrap(), 1);

    assert!(store.remove("a").unwrap());
    assert!(!store.remove("a").unwrap());
    assert_eq!(store.get("a").unwrap(), None);
}

#[test]
fn test_remove_by_regex_counts() {
    let store = MemoryStore::new();
    for key in ["req-p2d-0", "req-p2d-1", "p2d", "req-d2p-0", "other"] {
        store.put(key, Bytes::from(key.to_string())).unwrap();
    }

    assert_eq!(store.remove_by_regex(".*p2d.*").unwrap(), 3);
    assert_eq!(store.remove_by_regex(".*p2d.*").unwrap(), 0);
    // unanchored patterns match anywhere in the key
    assert_eq!(store.remove_by_regex("d2p").unwrap(), 1);
    assert_eq!(store.get("other").unwrap(), Some(Bytes::from_static(b"other")));
}

#[test]
fn test_invalid_pattern_rejected() {
    let store = MemoryStore::new();
    store.put("x", Bytes::new()).unwrap();
    assert!(matches!(
        store.remove_by_regex("(unclosed"),
        Err(StoreError::InvalidPattern(_))
    ));
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn test_smoke_sequence() {
    let store = MemoryStore::new();
    let report = smoke_test(&store).unwrap();
    assert!(report.passed());
    assert_eq!(report.fetched.as_deref(), Some(SMOKE_VALUE));
    assert!(store.is_empty().unwrap());
}

#[test]
fn test_token_wait_times_out() {
    let token = CancellationToken::new();
    let start = Instant::now();
    assert!(!token.wait_timeout(Duration::from_millis(20)));
    assert!(start.elapsed() >= Duration::from_millis(20));
    assert!(!token.is_cancelled());
}

#[test]
fn test_token_cancel_wakes_waiter() {
    let token = CancellationToken::new();
    let waiter = {
        let token = token.clone();
        thread::spawn(move || token.wait_timeout(Duration::from_secs(30)))
    };

    thread::sleep(Duration::from_millis(10));
    let start = Instant::now();
    token.cancel();
    assert!(waiter.join().unwrap());
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(token.is_cancelled());
}

#[test]
fn test_eviction_task_stops_on_cancel() {
    let store = Arc::new(MemoryStore::new());
    store.put("kv-p2d-0", Bytes::from_static(b"x")).unwrap();
    store.put("kv-keep", Bytes::from_static(b"y")).unwrap();

    let token = CancellationToken::new();
    let config = EvictionConfig {
        interval: Duration::from_millis(5),
        ..Default::default()
    };
    let handle = spawn_eviction(store.clone(), config, token.clone()).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while store.get("kv-p2d-0").unwrap().is_some() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    token.cancel();
    let stats = handle.join().unwrap();

    assert!(stats.cycles >= 1);
    assert_eq!(stats.removed, 1);
    assert_eq!(stats.errors, 0);
    assert_eq!(store.get("kv-keep").unwrap(), Some(Bytes::from_static(b"y")));
}

#[test]
fn test_eviction_rejects_invalid_pattern() {
    let config = EvictionConfig {
        pattern: "[".to_string(),
        ..Default::default()
    };
    let result = spawn_eviction(
        Arc::new(MemoryStore::new()),
        config,
        CancellationToken::new(),
    );
    assert!(matches!(result, Err(StoreError::InvalidPattern(_))));
}

/// Fails every call, to check that the task survives store errors
struct FailingStore {
    calls: Mutex<usize>,
}

impl KvStore for FailingStore {
    fn put(&self, _: &str, _: Bytes) -> StoreResult<()> {
        Err(StoreError::Poisoned)
    }

    fn get(&self, _: &str) -> StoreResult<Option<Bytes>> {
        Err(StoreError::Poisoned)
    }

    fn remove(&self, _: &str) -> StoreResult<bool> {
        Err(StoreError::Poisoned)
    }

    fn remove_by_regex(&self, _: &str) -> StoreResult<usize> {
        *self.calls.lock().unwrap() += 1;
        Err(StoreError::Poisoned)
    }
}

#[test]
fn test_eviction_survives_store_errors() {
    let store = Arc::new(FailingStore {
        calls: Mutex::new(0),
    });
    let token = CancellationToken::new();
    let config = EvictionConfig {
        interval: Duration::from_millis(1),
        ..Default::default()
    };
    let handle = spawn_eviction(store.clone(), config, token.clone()).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while *store.calls.lock().unwrap() < 3 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    token.cancel();
    let stats = handle.join().unwrap();

    assert!(stats.errors >= 3);
    assert_eq!(stats.errors, stats.cycles);
    assert_eq!(stats.removed, 0);
}

#[test]
fn test_http_store_rejects_unsafe_keys() {
    let store = HttpStore::connect("http://127.0.0.1:1/").unwrap();
    assert_eq!(store.endpoint(), "http://127.0.0.1:1");
    for key in ["", "a/b", "with space", "q?x=1"] {
        assert!(matches!(store.get(key), Err(StoreError::InvalidKey(_))));
    }
    assert!(matches!(
        store.remove_by_regex("(("),
        Err(StoreError::InvalidPattern(_))
    ));
}
