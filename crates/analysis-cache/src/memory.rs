//! In-memory store implementation.

use analysis_core::{
    AnalysisRecord, AnalysisStore, CacheEntry, CacheKey, Clock, IdentifierTuple, Result,
    SystemClock,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Simple in-memory store for testing and development.
///
/// Entries live in an `RwLock`-protected `HashMap` and are lost when the store
/// is dropped. Records are cloned on get/put operations.
#[derive(Debug)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl InMemoryCache {
    /// Create a new empty in-memory store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty in-memory store stamping entries with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl AnalysisStore for InMemoryCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn fetch_fresh(
        &self,
        key: &CacheKey,
        window: Duration,
    ) -> Result<Option<AnalysisRecord>> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now, window) => {
                debug!("Cache hit for analysis");
                Ok(Some(entry.record.clone()))
            }
            Some(_) => {
                debug!("Cached analysis is stale");
                Ok(None)
            }
            None => {
                debug!("Cache miss for analysis");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, tuple, record), fields(key = %key))]
    async fn upsert(
        &self,
        key: &CacheKey,
        tuple: &IdentifierTuple,
        record: &AnalysisRecord,
    ) -> Result<()> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) => {
                entry.symbol = record.stock.clone();
                entry.record = record.clone();
                entry.last_updated_at = now;
                debug!("Updated cached analysis");
            }
            None => {
                entries.insert(
                    key.clone(),
                    CacheEntry::new(key.clone(), tuple, record.clone(), now),
                );
                debug!("Inserted cached analysis");
            }
        }
        Ok(())
    }

    async fn entry(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{
        Exchange, FundamentalImpact, Horizon, ManualClock, MarketReaction, MoatTrend,
        RecommendedAction, RiskLevel, RiskProfile, Sentiment, Symbol, TimeHorizonImpact, Trend,
    };
    use chrono::{TimeDelta, Utc};

    fn record(symbol: &str, summary: &str) -> AnalysisRecord {
        AnalysisRecord {
            stock: Symbol::new(symbol),
            news_summary: summary.to_string(),
            news_type: Default::default(),
            sentiment: Sentiment::Neutral,
            market_reaction: MarketReaction::Flat,
            fundamental_impact: FundamentalImpact {
                revenue: Trend::Neutral,
                margins: Trend::Neutral,
                balance_sheet: Trend::Neutral,
                long_term_moat: MoatTrend::Stable,
            },
            time_horizon_impact: TimeHorizonImpact {
                short_term: "Range bound.".to_string(),
                long_term: "Unchanged.".to_string(),
            },
            risk_level: RiskLevel::Low,
            thesis_changed: false,
            valuation_comment: "Fair.".to_string(),
            recommended_action: RecommendedAction::Hold,
            action_reason: "No material news.".to_string(),
            invalidation_triggers: "Guidance cut.".to_string(),
        }
    }

    fn tuple(symbol: &str) -> IdentifierTuple {
        IdentifierTuple::new(
            symbol,
            Exchange::Nasdaq,
            Horizon::ShortTerm,
            RiskProfile::Moderate,
        )
    }

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_memory_cache_roundtrip() {
        let cache = InMemoryCache::new();
        let tuple = tuple("AAPL");
        let key = tuple.key();

        // Initially no data
        assert!(cache.fetch_fresh(&key, HOUR).await.unwrap().is_none());

        cache
            .upsert(&key, &tuple, &record("AAPL", "first"))
            .await
            .unwrap();

        let cached = cache.fetch_fresh(&key, HOUR).await.unwrap().unwrap();
        assert_eq!(cached.news_summary, "first");
    }

    #[tokio::test]
    async fn test_memory_cache_freshness_boundary() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = InMemoryCache::with_clock(clock.clone());
        let tuple = tuple("MSFT");
        let key = tuple.key();
        cache
            .upsert(&key, &tuple, &record("MSFT", "x"))
            .await
            .unwrap();

        clock.advance(TimeDelta::hours(1));
        assert!(cache.fetch_fresh(&key, HOUR).await.unwrap().is_some());

        clock.advance(TimeDelta::microseconds(1));
        assert!(cache.fetch_fresh(&key, HOUR).await.unwrap().is_none());

        // Stale entries are still stored, only hidden from fresh lookups.
        assert!(cache.entry(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_memory_cache_upsert_updates_in_place() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = InMemoryCache::with_clock(clock.clone());
        let tuple = tuple("AAPL");
        let key = tuple.key();

        cache
            .upsert(&key, &tuple, &record("AAPL", "old"))
            .await
            .unwrap();
        let first = cache.entry(&key).await.unwrap().unwrap();

        clock.advance(TimeDelta::minutes(90));
        cache
            .upsert(&key, &tuple, &record("AAPL", "new"))
            .await
            .unwrap();
        let second = cache.entry(&key).await.unwrap().unwrap();

        assert_eq!(cache.len().await.unwrap(), 1);
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(
            second.last_updated_at,
            first.last_updated_at + TimeDelta::minutes(90)
        );
        assert_eq!(second.record.news_summary, "new");
    }

    #[tokio::test]
    async fn test_memory_cache_denormalizes_tuple() {
        let cache = InMemoryCache::new();
        let tuple = IdentifierTuple::new(
            "INFY",
            Exchange::Nse,
            Horizon::LongTerm,
            RiskProfile::Low,
        );
        cache
            .upsert(&tuple.key(), &tuple, &record("INFY", "x"))
            .await
            .unwrap();

        let entry = cache.entry(&tuple.key()).await.unwrap().unwrap();
        assert_eq!(entry.exchange, Exchange::Nse);
        assert_eq!(entry.horizon, Horizon::LongTerm);
        assert_eq!(entry.risk_profile, RiskProfile::Low);
        assert_eq!(entry.symbol.as_str(), "INFY");
    }

    #[tokio::test]
    async fn test_memory_cache_clear() {
        let cache = InMemoryCache::new();
        let tuple = tuple("AAPL");
        cache
            .upsert(&tuple.key(), &tuple, &record("AAPL", "x"))
            .await
            .unwrap();

        cache.clear().await.unwrap();

        assert!(cache.is_empty().await.unwrap());
        let cached = cache.fetch_fresh(&tuple.key(), HOUR).await.unwrap();
        assert!(cached.is_none());
    }
}
