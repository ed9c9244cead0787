//! C7 TransportCache single-flight behavior (§4.7), exercised directly
//! against the cache rather than through a real dial.

use impersonate::transport::{Protocol, TransportCache, TransportEntry, TransportKey};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn empty_entry() -> TransportEntry {
    TransportEntry { protocol: Protocol::Http2, h2: None, h1: None, tls_info: None }
}

#[tokio::test]
async fn distinct_keys_build_independently() {
    let cache = TransportCache::new();
    let a = TransportKey::new("a.example.com", 443, "chrome_133");
    let b = TransportKey::new("b.example.com", 443, "chrome_133");

    cache.get_or_build(a, || async { Ok(empty_entry()) }).await.unwrap();
    cache.get_or_build(b, || async { Ok(empty_entry()) }).await.unwrap();

    assert_eq!(cache.len().await, 2);
}

#[tokio::test]
async fn http1_and_http2_keys_for_the_same_host_dont_collide() {
    let cache = TransportCache::new();
    let h2_key = TransportKey::new("example.com", 443, "chrome_133");
    let h1_key = h2_key.clone().with_force_http1(true);

    cache.get_or_build(h2_key, || async { Ok(empty_entry()) }).await.unwrap();
    cache.get_or_build(h1_key, || async { Ok(empty_entry()) }).await.unwrap();

    assert_eq!(cache.len().await, 2);
}

#[tokio::test]
async fn eviction_forces_a_rebuild() {
    let cache = TransportCache::new();
    let key = TransportKey::new("example.com", 443, "chrome_133");
    let build_count = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let build_count = build_count.clone();
        cache
            .get_or_build(key.clone(), || async move {
                build_count.fetch_add(1, Ordering::SeqCst);
                Ok(empty_entry())
            })
            .await
            .unwrap();
        cache.evict(&key).await;
    }

    assert_eq!(build_count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_builds_for_the_same_key_run_the_builder_once() {
    let cache = Arc::new(TransportCache::new());
    let key = TransportKey::new("shared.example.com", 443, "firefox_133");
    let build_count = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let cache = cache.clone();
        let key = key.clone();
        let build_count = build_count.clone();
        handles.push(tokio::spawn(async move {
            cache
                .get_or_build(key, || async {
                    build_count.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    Ok(empty_entry())
                })
                .await
        }));
    }

    for h in handles {
        h.await.unwrap().unwrap();
    }

    assert_eq!(build_count.load(Ordering::SeqCst), 1);
}
