//! Short-lived cache for the read-only lists that populate selectors.
//!
//! Entries are served until they are older than the staleness window, then
//! re-fetched. Concurrent callers may both miss and both fetch; the calls are
//! idempotent GETs, so the last writer simply wins.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::models::{Monitor, RegionsResponse};
use super::{ApiError, MonitorApi};

struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

pub struct SelectorCache<A: ?Sized> {
    api: Arc<A>,
    ttl: Duration,
    monitors: RwLock<Option<Cached<Vec<Monitor>>>>,
    regions: RwLock<Option<Cached<RegionsResponse>>>,
}

impl<A: MonitorApi + ?Sized> SelectorCache<A> {
    pub fn new(api: Arc<A>, ttl: Duration) -> Self {
        Self {
            api,
            ttl,
            monitors: RwLock::new(None),
            regions: RwLock::new(None),
        }
    }

    fn is_fresh<T>(&self, entry: &Option<Cached<T>>) -> bool {
        entry
            .as_ref()
            .is_some_and(|c| c.fetched_at.elapsed() < self.ttl)
    }

    pub async fn monitors(&self) -> Result<Vec<Monitor>, ApiError> {
        {
            let guard = self.monitors.read().await;
            if self.is_fresh(&guard) {
                if let Some(cached) = guard.as_ref() {
                    return Ok(cached.value.clone());
                }
            }
        }
        debug!("Monitor list cache is stale, fetching.");
        let value = self.api.list_monitors().await?;
        *self.monitors.write().await = Some(Cached {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    pub async fn regions(&self) -> Result<RegionsResponse, ApiError> {
        {
            let guard = self.regions.read().await;
            if self.is_fresh(&guard) {
                if let Some(cached) = guard.as_ref() {
                    return Ok(cached.value.clone());
                }
            }
        }
        debug!("Region list cache is stale, fetching.");
        let value = self.api.list_regions().await?;
        *self.regions.write().await = Some(Cached {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    /// Monitors offered by the dependency picker, minus `excluded` ids.
    pub async fn monitors_excluding(&self, excluded: &[String]) -> Result<Vec<Monitor>, ApiError> {
        let monitors = self.monitors().await?;
        Ok(monitors
            .into_iter()
            .filter(|m| !excluded.contains(&m.id))
            .collect())
    }

    /// Drops the monitor list, e.g. after a monitor was created or renamed.
    pub async fn invalidate_monitors(&self) {
        *self.monitors.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{FakeApi, monitor_fixture};

    #[tokio::test(start_paused = true)]
    async fn test_lists_are_served_from_cache_until_stale() {
        let api = Arc::new(FakeApi::default());
        api.add_monitor(monitor_fixture("m1", "Web"));
        let cache = SelectorCache::new(api.clone(), Duration::from_secs(30));

        assert_eq!(cache.monitors().await.unwrap().len(), 1);
        assert_eq!(cache.monitors().await.unwrap().len(), 1);
        assert_eq!(api.calls_named("list_monitors"), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        cache.monitors().await.unwrap();
        assert_eq!(api.calls_named("list_monitors"), 2);

        cache.regions().await.unwrap();
        cache.regions().await.unwrap();
        assert_eq!(api.calls_named("list_regions"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_picker_excludes_ids_and_invalidation_refetches() {
        let api = Arc::new(FakeApi::default());
        api.add_monitor(monitor_fixture("m1", "Web"));
        api.add_monitor(monitor_fixture("m2", "Db"));
        let cache = SelectorCache::new(api.clone(), Duration::from_secs(30));

        let options = cache.monitors_excluding(&["m1".to_string()]).await.unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].id, "m2");

        cache.invalidate_monitors().await;
        cache.monitors().await.unwrap();
        assert_eq!(api.calls_named("list_monitors"), 2);
    }
}
