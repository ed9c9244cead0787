//! C7 TransportCache: keyed, at-most-once-build connection cache (§4.7,
//! §5). Concurrent requests for the same [`TransportKey`] must share one
//! in-flight build rather than racing to open N redundant connections --
//! implemented with `tokio::sync::OnceCell` behind the map entry, the
//! standard single-flight idiom for async Rust.

use super::key::TransportKey;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

pub enum Protocol {
    Http1,
    Http2,
    Http3,
}

pub struct TransportEntry {
    pub protocol: Protocol,
    pub h2: Option<Arc<crate::h2::Connection<tokio_boring::SslStream<tokio::net::TcpStream>>>>,
    /// Present for `Protocol::Http1` entries; locked around each request
    /// since, unlike the multiplexed `h2::Connection`, only one HTTP/1.1
    /// request can be in flight on the wire at a time.
    pub h1: Option<Arc<tokio::sync::Mutex<tokio_boring::SslStream<tokio::net::TcpStream>>>>,
    /// Captured once at handshake time since a reused connection never
    /// re-negotiates TLS.
    pub tls_info: Option<crate::response::TlsInfo>,
}

type Slot = Arc<OnceCell<Arc<TransportEntry>>>;

/// Shared cache of established connections keyed by [`TransportKey`].
/// `slots` is only locked to find-or-insert a `Slot`; the expensive dial
/// happens after the lock is released, against that slot's own
/// `OnceCell::get_or_try_init`, so concurrent dials to *different* keys
/// never block each other.
pub struct TransportCache {
    slots: Mutex<HashMap<TransportKey, Slot>>,
}

impl TransportCache {
    pub fn new() -> Self {
        Self { slots: Mutex::new(HashMap::new()) }
    }

    pub async fn get_or_build<F, Fut>(&self, key: TransportKey, build: F) -> crate::error::Result<Arc<TransportEntry>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = crate::error::Result<TransportEntry>>,
    {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots.entry(key).or_insert_with(|| Arc::new(OnceCell::new())).clone()
        };

        slot.get_or_try_init(|| async { build().await.map(Arc::new) }).await.cloned()
    }

    pub async fn evict(&self, key: &TransportKey) {
        self.slots.lock().await.remove(key);
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }
}

impl Default for TransportCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn concurrent_requests_for_same_key_build_once() {
        let cache = Arc::new(TransportCache::new());
        let build_count = Arc::new(AtomicUsize::new(0));
        let key = TransportKey::new("example.com", 443, "chrome_133");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let build_count = build_count.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_build(key, || async {
                        build_count.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        Ok(TransportEntry { protocol: Protocol::Http2, h2: None, h1: None, tls_info: None })
                    })
                    .await
            }));
        }

        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert_eq!(build_count.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }
}
