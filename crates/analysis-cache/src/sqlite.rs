//! SQLite-based store implementation.

use analysis_core::{
    AnalysisError, AnalysisRecord, AnalysisStore, CacheEntry, CacheKey, Clock, IdentifierTuple,
    Result, Symbol, SystemClock, is_fresh,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

/// SQLite-based store for analyses.
///
/// Entries live in a single `analysis_cache` table with a unique constraint on
/// the derived key, so upserts are a single `INSERT ... ON CONFLICT` statement.
/// Records are stored as JSON; exchange, horizon and risk profile are stored
/// as their canonical strings next to the payload for querying.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
}

impl SqliteCache {
    /// Create a new SQLite store at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| AnalysisError::Cache(e.to_string()))?;
        Self::from_connection(conn, Arc::new(SystemClock))
    }

    /// Create an in-memory SQLite store.
    ///
    /// Useful for testing; data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| AnalysisError::Cache(e.to_string()))?;
        Self::from_connection(conn, Arc::new(SystemClock))
    }

    /// Replace the clock used to stamp and age entries.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn from_connection(conn: Connection, clock: Arc<dyn Clock>) -> Result<Self> {
        let cache = Self {
            conn: Mutex::new(conn),
            clock,
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| AnalysisError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS analysis_cache (
                id TEXT PRIMARY KEY,
                cache_key TEXT NOT NULL UNIQUE,
                stock_symbol TEXT NOT NULL,
                exchange TEXT NOT NULL,
                horizon TEXT NOT NULL,
                risk_profile TEXT NOT NULL,
                analysis_data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_updated_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| AnalysisError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_analysis_exchange_horizon_risk
             ON analysis_cache(exchange, horizon, risk_profile)",
            [],
        )
        .map_err(|e| AnalysisError::Cache(e.to_string()))?;

        debug!("SQLite cache schema initialized");
        Ok(())
    }

    /// Format a timestamp for storage at full nanosecond precision.
    fn timestamp_to_str(ts: DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// Parse a stored timestamp.
    fn str_to_timestamp(s: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| AnalysisError::Parse(format!("Invalid timestamp {s}: {e}")))
    }
}

#[async_trait]
impl AnalysisStore for SqliteCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn fetch_fresh(
        &self,
        key: &CacheKey,
        window: Duration,
    ) -> Result<Option<AnalysisRecord>> {
        let now = self.clock.now();

        let conn = self
            .conn
            .lock()
            .map_err(|e| AnalysisError::Cache(e.to_string()))?;

        let row = conn
            .query_row(
                "SELECT analysis_data, last_updated_at FROM analysis_cache WHERE cache_key = ?1",
                params![key.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(|e| AnalysisError::Cache(e.to_string()))?;

        let Some((data, last_updated_at)) = row else {
            debug!("Cache miss for analysis");
            return Ok(None);
        };

        if !is_fresh(Self::str_to_timestamp(&last_updated_at)?, now, window) {
            debug!(last_updated_at = %last_updated_at, "Cached analysis is stale");
            return Ok(None);
        }

        if data.is_empty() {
            debug!("Cached analysis has an empty payload");
            return Ok(None);
        }

        let record: AnalysisRecord = serde_json::from_str(&data)?;
        debug!("Cache hit for analysis");
        Ok(Some(record))
    }

    #[instrument(skip(self, tuple, record), fields(key = %key))]
    async fn upsert(
        &self,
        key: &CacheKey,
        tuple: &IdentifierTuple,
        record: &AnalysisRecord,
    ) -> Result<()> {
        let now = Self::timestamp_to_str(self.clock.now());
        let data = serde_json::to_string(record)?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| AnalysisError::Cache(e.to_string()))?;

        conn.execute(
            "INSERT INTO analysis_cache
             (id, cache_key, stock_symbol, exchange, horizon, risk_profile,
              analysis_data, created_at, last_updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             ON CONFLICT(cache_key) DO UPDATE SET
                stock_symbol = excluded.stock_symbol,
                analysis_data = excluded.analysis_data,
                last_updated_at = excluded.last_updated_at",
            params![
                Uuid::new_v4().to_string(),
                key.as_str(),
                record.stock.as_str(),
                tuple.exchange.as_str(),
                tuple.horizon.as_str(),
                tuple.risk_profile.as_str(),
                data,
                now
            ],
        )
        .map_err(|e| AnalysisError::Cache(e.to_string()))?;

        debug!("Cached analysis");
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn entry(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| AnalysisError::Cache(e.to_string()))?;

        let row = conn
            .query_row(
                "SELECT id, stock_symbol, exchange, horizon, risk_profile,
                        analysis_data, created_at, last_updated_at
                 FROM analysis_cache WHERE cache_key = ?1",
                params![key.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| AnalysisError::Cache(e.to_string()))?;

        let Some((id, symbol, exchange, horizon, risk_profile, data, created_at, last_updated_at)) =
            row
        else {
            return Ok(None);
        };

        Ok(Some(CacheEntry {
            id: Uuid::parse_str(&id).map_err(|e| AnalysisError::Parse(e.to_string()))?,
            key: key.clone(),
            symbol: Symbol::new(symbol),
            exchange: exchange.parse()?,
            horizon: horizon.parse()?,
            risk_profile: risk_profile.parse()?,
            record: serde_json::from_str(&data)?,
            created_at: Self::str_to_timestamp(&created_at)?,
            last_updated_at: Self::str_to_timestamp(&last_updated_at)?,
        }))
    }

    async fn len(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| AnalysisError::Cache(e.to_string()))?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM analysis_cache", [], |row| row.get(0))
            .map_err(|e| AnalysisError::Cache(e.to_string()))?;

        usize::try_from(count).map_err(|e| AnalysisError::Cache(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| AnalysisError::Cache(e.to_string()))?;

        conn.execute("DELETE FROM analysis_cache", [])
            .map_err(|e| AnalysisError::Cache(e.to_string()))?;

        debug!("Cleared all cache entries");
        Ok(())
    }
}
