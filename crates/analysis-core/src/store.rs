//! Store trait for persisted analyses.
//!
//! This module defines the [`AnalysisStore`] trait that durable backends
//! implement, the [`CacheEntry`] they persist, and the [`is_fresh`] rule every
//! backend applies when answering a fresh lookup.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::{
    error::Result,
    key::{CacheKey, IdentifierTuple},
    record::AnalysisRecord,
    types::{Exchange, Horizon, RiskProfile, Symbol},
};

/// Default freshness window: one hour.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Returns true if an entry last updated at `last_updated_at` is still fresh
/// at `now` for the given window.
///
/// The boundary is inclusive: an entry exactly `window` old is fresh.
#[must_use]
pub fn is_fresh(last_updated_at: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
    now.signed_duration_since(last_updated_at) <= window
}

/// One persisted analysis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Surrogate id assigned by the store on insert.
    pub id: Uuid,
    /// Derived key; unique across entries.
    pub key: CacheKey,
    /// Symbol the record is about.
    pub symbol: Symbol,
    /// Exchange, denormalized for querying.
    pub exchange: Exchange,
    /// Horizon, denormalized for querying.
    pub horizon: Horizon,
    /// Risk profile, denormalized for querying.
    pub risk_profile: RiskProfile,
    /// The cached analysis.
    pub record: AnalysisRecord,
    /// When the entry was first written.
    pub created_at: DateTime<Utc>,
    /// When the entry was last overwritten.
    pub last_updated_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates a new entry stamped with `now` for both timestamps.
    #[must_use]
    pub fn new(
        key: CacheKey,
        tuple: &IdentifierTuple,
        record: AnalysisRecord,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            symbol: record.stock.clone(),
            exchange: tuple.exchange,
            horizon: tuple.horizon,
            risk_profile: tuple.risk_profile,
            record,
            created_at: now,
            last_updated_at: now,
        }
    }

    /// Returns true if this entry is fresh at `now` for the given window.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        is_fresh(self.last_updated_at, now, window)
    }
}

/// Trait for durable analysis storage.
///
/// Implementations own the entry lifecycle: they assign ids and timestamps
/// from their own clock and guarantee at most one entry per key.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Retrieves the cached record for `key` if it was updated within `window`.
    ///
    /// Returns `Ok(None)` when there is no entry or the entry is stale.
    async fn fetch_fresh(&self, key: &CacheKey, window: Duration) -> Result<Option<AnalysisRecord>>;

    /// Inserts an entry for `key`, or overwrites the record and bumps
    /// `last_updated_at` of the existing one. Last writer wins.
    async fn upsert(
        &self,
        key: &CacheKey,
        tuple: &IdentifierTuple,
        record: &AnalysisRecord,
    ) -> Result<()>;

    /// Retrieves the full entry for `key` regardless of age.
    async fn entry(&self, key: &CacheKey) -> Result<Option<CacheEntry>>;

    /// Returns the number of stored entries.
    async fn len(&self) -> Result<usize>;

    /// Returns true if nothing is stored.
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Clears all cached entries.
    async fn clear(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freshness_boundary_is_inclusive() {
        let now = Utc::now();
        let window = Duration::from_secs(3600);

        assert!(is_fresh(now - TimeDelta::hours(1), now, window));
        assert!(!is_fresh(
            now - TimeDelta::hours(1) - TimeDelta::microseconds(1),
            now,
            window
        ));
    }

    #[test]
    fn test_recent_entry_is_fresh() {
        let now = Utc::now();
        let ten_minutes_ago = now - TimeDelta::minutes(10);
        assert!(is_fresh(ten_minutes_ago, now, DEFAULT_FRESHNESS_WINDOW));
        assert!(is_fresh(now, now, Duration::ZERO));
    }

    #[test]
    fn test_future_timestamp_is_fresh() {
        let now = Utc::now();
        assert!(is_fresh(now + TimeDelta::seconds(5), now, Duration::ZERO));
    }

    #[test]
    fn test_huge_window_never_expires() {
        let now = Utc::now();
        assert!(is_fresh(now - TimeDelta::days(3650), now, Duration::MAX));
    }
}
