//! Time-bounded snapshot cache in front of any [`WeekProvider`].
//!
//! Explain and grid requests for the same week arrive in bursts while games
//! are live. The cache keeps each week's snapshot for a fixed TTL so a burst
//! costs one upstream fetch. A zero TTL turns caching off.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use super::models::WeekSnapshot;
use super::provider::WeekProvider;

pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    /// week → (fetched at, snapshot)
    entries: Arc<RwLock<HashMap<u8, (Instant, WeekSnapshot)>>>,
}

impl<P: WeekProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        CachedProvider {
            inner,
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Drop the cached snapshot for one week, if any.
    pub async fn invalidate(&self, week: u8) {
        self.entries.write().await.remove(&week);
    }

    pub async fn cached_weeks(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn fresh(&self, week: u8) -> Option<WeekSnapshot> {
        let entries = self.entries.read().await;
        let (at, snapshot) = entries.get(&week)?;
        (at.elapsed() < self.ttl).then(|| snapshot.clone())
    }
}

#[async_trait]
impl<P: WeekProvider> WeekProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_week(&self, week: u8) -> Result<WeekSnapshot> {
        if self.ttl.is_zero() {
            return self.inner.fetch_week(week).await;
        }
        if let Some(hit) = self.fresh(week).await {
            debug!("Cache hit for week {}", week);
            return Ok(hit);
        }

        let snapshot = self.inner.fetch_week(week).await?;
        self.entries
            .write()
            .await
            .insert(week, (Instant::now(), snapshot.clone()));
        debug!("Cached week {} from {}", week, self.inner.name());
        Ok(snapshot)
    }
}
