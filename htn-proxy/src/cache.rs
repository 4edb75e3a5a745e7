use std::sync::Arc;

use tokio::{sync::RwLock, time::Instant};

pub struct Config {
    /// Refetch once the snapshot is older than `ttl`. Without it the first
    /// successful fetch is kept for the whole run.
    pub refresh: bool,
    pub ttl: std::time::Duration,
}

/// The last successfully fetched value. A failed refresh leaves the previous
/// value in place.
pub struct Snapshot<V> {
    refresh: bool,
    ttl: std::time::Duration,
    inner: RwLock<Option<(Instant, Arc<V>)>>,
}

impl<V> Snapshot<V> {
    pub fn new(config: Config) -> Self {
        Self {
            refresh: config.refresh,
            ttl: config.ttl,
            inner: RwLock::new(None),
        }
    }

    /// The stored value unless it is due for a refresh.
    pub async fn fresh(&self) -> Option<Arc<V>> {
        let guard = self.inner.read().await;
        let (stored_at, value) = guard.as_ref()?;
        (!self.refresh || stored_at.elapsed() < self.ttl).then(|| Arc::clone(value))
    }

    /// The stored value regardless of age.
    pub async fn last(&self) -> Option<Arc<V>> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|(_, value)| Arc::clone(value))
    }

    pub async fn store(&self, value: V) -> Arc<V> {
        let value = Arc::new(value);
        *self.inner.write().await = Some((Instant::now(), Arc::clone(&value)));
        value
    }
}
