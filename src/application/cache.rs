use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::domain::Ledger;

struct CacheEntry {
    ledger: Arc<Ledger>,
    stored_at: Instant,
}

/// Parsed ledgers keyed by source identifier, each kept for a fixed
/// time-to-live before it has to be fetched again.
///
/// The aggregation core never sees this; it only ever receives a ledger.
pub struct LedgerCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl LedgerCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached ledger for `key`, if one was stored less than `ttl` ago.
    pub async fn get(&self, key: &str) -> Option<Arc<Ledger>> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            tracing::debug!(source = key, "ledger cache hit");
            Some(Arc::clone(&entry.ledger))
        } else {
            tracing::debug!(source = key, "ledger cache entry expired");
            None
        }
    }

    pub async fn insert(&self, key: impl Into<String>, ledger: Ledger) -> Arc<Ledger> {
        let ledger = Arc::new(ledger);
        self.entries.write().await.insert(
            key.into(),
            CacheEntry {
                ledger: Arc::clone(&ledger),
                stored_at: Instant::now(),
            },
        );
        ledger
    }

    /// Age of the entry for `key`, stale or not.
    pub async fn age(&self, key: &str) -> Option<Duration> {
        self.entries
            .read()
            .await
            .get(key)
            .map(|entry| entry.stored_at.elapsed())
    }

    pub async fn invalidate(&self, key: &str) {
        if self.entries.write().await.remove(key).is_some() {
            tracing::debug!(source = key, "ledger cache entry invalidated");
        }
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
