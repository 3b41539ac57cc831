//! Infallible facade over an [`AnalysisStore`].
//!
//! The coalescer treats the store as best effort: a failed read is a miss and a
//! failed write is a log line. [`CacheStore`] applies that policy in one place.

use analysis_core::{AnalysisRecord, AnalysisStore, CacheKey, IdentifierTuple};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Best-effort access to persisted analyses.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn AnalysisStore>,
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore").finish_non_exhaustive()
    }
}

impl CacheStore {
    /// Wraps a store backend.
    #[must_use]
    pub fn new(backend: Arc<dyn AnalysisStore>) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn AnalysisStore> {
        &self.backend
    }

    /// Returns the cached record for `key` if it was updated within `window`.
    ///
    /// Store errors are logged and reported as a miss.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn lookup_fresh(&self, key: &CacheKey, window: Duration) -> Option<AnalysisRecord> {
        match self.backend.fetch_fresh(key, window).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Inserts or overwrites the entry for `key`.
    ///
    /// Store errors are logged and swallowed.
    #[instrument(skip(self, tuple, record), fields(key = %key))]
    pub async fn upsert(&self, key: &CacheKey, tuple: &IdentifierTuple, record: &AnalysisRecord) {
        match self.backend.upsert(key, tuple, record).await {
            Ok(()) => debug!("Persisted analysis"),
            Err(e) => error!(error = %e, "Failed to persist analysis"),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use analysis_cache::InMemoryCache;
    use analysis_core::{
        AnalysisError, CacheEntry, Exchange, FundamentalImpact, Horizon, MarketReaction,
        MoatTrend, RecommendedAction, Result, RiskLevel, RiskProfile, Sentiment, Symbol,
        TimeHorizonImpact, Trend,
    };
    use async_trait::async_trait;
    use std::collections::BTreeSet;

    const HOUR: Duration = Duration::from_secs(3600);

    /// Store whose every operation fails.
    #[derive(Debug, Default)]
    pub(crate) struct BrokenStore;

    #[async_trait]
    impl AnalysisStore for BrokenStore {
        async fn fetch_fresh(&self, _: &CacheKey, _: Duration) -> Result<Option<AnalysisRecord>> {
            Err(AnalysisError::Cache("database is locked".into()))
        }

        async fn upsert(
            &self,
            _: &CacheKey,
            _: &IdentifierTuple,
            _: &AnalysisRecord,
        ) -> Result<()> {
            Err(AnalysisError::Cache("disk full".into()))
        }

        async fn entry(&self, _: &CacheKey) -> Result<Option<CacheEntry>> {
            Err(AnalysisError::Cache("database is locked".into()))
        }

        async fn len(&self) -> Result<usize> {
            Err(AnalysisError::Cache("database is locked".into()))
        }

        async fn clear(&self) -> Result<()> {
            Err(AnalysisError::Cache("database is locked".into()))
        }
    }

    pub(crate) fn record(symbol: &str) -> AnalysisRecord {
        AnalysisRecord {
            stock: Symbol::new(symbol),
            news_summary: format!("{symbol} reported a quiet week."),
            news_type: BTreeSet::new(),
            sentiment: Sentiment::Neutral,
            market_reaction: MarketReaction::Flat,
            fundamental_impact: FundamentalImpact {
                revenue: Trend::Neutral,
                margins: Trend::Neutral,
                balance_sheet: Trend::Neutral,
                long_term_moat: MoatTrend::Stable,
            },
            time_horizon_impact: TimeHorizonImpact {
                short_term: "No change.".into(),
                long_term: "No change.".into(),
            },
            risk_level: RiskLevel::Medium,
            thesis_changed: false,
            valuation_comment: "Fair.".into(),
            recommended_action: RecommendedAction::Hold,
            action_reason: "Nothing new.".into(),
            invalidation_triggers: "Guidance cut.".into(),
        }
    }

    fn tuple(symbol: &str) -> IdentifierTuple {
        IdentifierTuple::new(
            Symbol::new(symbol),
            Exchange::Nasdaq,
            Horizon::ShortTerm,
            RiskProfile::Moderate,
        )
    }

    #[tokio::test]
    async fn test_lookup_error_is_a_miss() {
        let store = CacheStore::new(Arc::new(BrokenStore));
        let key = tuple("AAPL").key();
        assert!(store.lookup_fresh(&key, HOUR).await.is_none());
    }

    #[tokio::test]
    async fn test_upsert_error_is_swallowed() {
        let store = CacheStore::new(Arc::new(BrokenStore));
        let tuple = tuple("AAPL");
        store.upsert(&tuple.key(), &tuple, &record("AAPL")).await;
    }

    #[tokio::test]
    async fn test_upsert_then_lookup() {
        let store = CacheStore::new(Arc::new(InMemoryCache::new()));
        let tuple = tuple("AAPL");
        let key = tuple.key();

        assert!(store.lookup_fresh(&key, HOUR).await.is_none());
        store.upsert(&key, &tuple, &record("AAPL")).await;
        assert_eq!(store.lookup_fresh(&key, HOUR).await, Some(record("AAPL")));
        assert_eq!(store.backend().len().await.unwrap(), 1);
    }
}
