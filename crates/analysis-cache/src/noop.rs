//! No-op store implementation.

use analysis_core::{AnalysisRecord, AnalysisStore, CacheEntry, CacheKey, IdentifierTuple, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

/// A no-op store that doesn't keep anything.
///
/// Every lookup misses and every upsert succeeds without storing. Useful for
/// disabling caching so each request goes to the analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AnalysisStore for NoopCache {
    async fn fetch_fresh(
        &self,
        _key: &CacheKey,
        _window: Duration,
    ) -> Result<Option<AnalysisRecord>> {
        trace!("NoopCache: fetch_fresh called, returning None");
        Ok(None)
    }

    async fn upsert(
        &self,
        _key: &CacheKey,
        _tuple: &IdentifierTuple,
        _record: &AnalysisRecord,
    ) -> Result<()> {
        trace!("NoopCache: upsert called, doing nothing");
        Ok(())
    }

    async fn entry(&self, _key: &CacheKey) -> Result<Option<CacheEntry>> {
        trace!("NoopCache: entry called, returning None");
        Ok(None)
    }

    async fn len(&self) -> Result<usize> {
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{Exchange, Horizon, RiskProfile};

    #[tokio::test]
    async fn test_noop_cache_never_hits() {
        let cache = NoopCache::new();
        let tuple = IdentifierTuple::new(
            "AAPL",
            Exchange::Nasdaq,
            Horizon::ShortTerm,
            RiskProfile::Low,
        );

        assert!(
            cache
                .fetch_fresh(&tuple.key(), Duration::MAX)
                .await
                .unwrap()
                .is_none()
        );
        assert!(cache.entry(&tuple.key()).await.unwrap().is_none());
        assert!(cache.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_noop_cache_management() {
        let cache = NoopCache::new();
        assert_eq!(cache.len().await.unwrap(), 0);
        assert!(cache.clear().await.is_ok());
    }

    #[test]
    fn test_noop_cache_is_copy() {
        let cache1 = NoopCache::new();
        let cache2 = cache1; // Copy
        let _cache3 = cache2; // Still works because Copy
    }
}
