//! Request coalescing over the cache and the analyzer.

use analysis_core::{
    AnalysisRecord, AnalysisRequest, Analyzer, Exchange, Horizon, IdentifierTuple, MissBatch,
    RiskProfile, Symbol, TaskSpawner, TokioSpawner,
};
use futures::FutureExt;
use futures::future::join_all;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{cache_store::CacheStore, config::CoalescerConfig};

/// Outcome of one coalesced request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Records produced by the analyzer for this request, in analyzer order.
    pub fresh: Vec<AnalysisRecord>,
    /// Records served from cache, in request order.
    pub cached: Vec<AnalysisRecord>,
    /// Symbols that missed the cache, in request order.
    pub misses: Vec<Symbol>,
}

impl Resolution {
    /// Returns the miss symbols for which the analyzer produced no record.
    ///
    /// Each fresh record accounts for one miss of its symbol, so a symbol
    /// requested twice and analysed once is reported once.
    #[must_use]
    pub fn unresolved(&self) -> Vec<&Symbol> {
        let mut produced: HashMap<&Symbol, usize> = HashMap::new();
        for record in &self.fresh {
            *produced.entry(&record.stock).or_default() += 1;
        }

        self.misses
            .iter()
            .filter(|symbol| match produced.get_mut(symbol) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    false
                }
                _ => true,
            })
            .collect()
    }

    /// Flattens into fresh records followed by cached ones.
    #[must_use]
    pub fn into_records(self) -> Vec<AnalysisRecord> {
        let mut records = self.fresh;
        records.extend(self.cached);
        records
    }
}

/// Serves analysis requests from cache and batches every miss into one
/// analyzer call.
///
/// Fresh records are persisted in the background; the response never waits on
/// the store write and never fails because of it.
#[derive(Clone)]
pub struct AnalysisCoalescer {
    store: CacheStore,
    analyzer: Arc<dyn Analyzer>,
    spawner: Arc<dyn TaskSpawner>,
    config: CoalescerConfig,
}

impl fmt::Debug for AnalysisCoalescer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisCoalescer")
            .field("analyzer", &self.analyzer.name())
            .field("spawner", &self.spawner)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnalysisCoalescer {
    /// Creates a coalescer with detached tokio persistence and default config.
    #[must_use]
    pub fn new(store: CacheStore, analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            store,
            analyzer,
            spawner: Arc::new(TokioSpawner::new()),
            config: CoalescerConfig::default(),
        }
    }

    /// Sets the spawner used for background persistence.
    #[must_use]
    pub fn with_spawner(mut self, spawner: Arc<dyn TaskSpawner>) -> Self {
        self.spawner = spawner;
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub const fn with_config(mut self, config: CoalescerConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CoalescerConfig {
        &self.config
    }

    /// Returns the store.
    #[must_use]
    pub const fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Resolves analyses for plain symbols.
    pub async fn resolve_symbols<I, S>(
        &self,
        exchange: Exchange,
        symbols: I,
        horizon: Horizon,
        risk_profile: RiskProfile,
    ) -> Vec<AnalysisRecord>
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let request = AnalysisRequest::new(exchange, symbols, horizon, risk_profile);
        self.resolve(&request).await
    }

    /// Resolves analyses for every holding in the request.
    ///
    /// Returns freshly computed records followed by cached ones. Never fails:
    /// if the analyzer fails, only the cached records are returned.
    pub async fn resolve(&self, request: &AnalysisRequest) -> Vec<AnalysisRecord> {
        self.resolve_detailed(request).await.into_records()
    }

    /// Resolves analyses and reports which records came from where.
    #[instrument(
        skip(self, request),
        fields(
            exchange = %request.exchange,
            horizon = %request.horizon,
            risk_profile = %request.risk_profile,
            holdings = request.holdings.len(),
        )
    )]
    pub async fn resolve_detailed(&self, request: &AnalysisRequest) -> Resolution {
        if request.is_empty() {
            return Resolution::default();
        }

        let window = self.config.freshness_window;
        let tuples: Vec<IdentifierTuple> = request
            .holdings
            .iter()
            .map(|h| {
                IdentifierTuple::new(
                    h.symbol.clone(),
                    request.exchange,
                    request.horizon,
                    request.risk_profile,
                )
            })
            .collect();

        let lookups = join_all(tuples.iter().map(|tuple| {
            let key = tuple.key();
            let store = &self.store;
            async move { store.lookup_fresh(&key, window).await }
        }))
        .await;

        let mut resolution = Resolution::default();
        let mut batch = MissBatch::new(request.exchange, request.horizon, request.risk_profile);
        for (holding, hit) in request.holdings.iter().zip(lookups) {
            match hit {
                Some(record) => resolution.cached.push(record),
                None => {
                    resolution.misses.push(holding.symbol.clone());
                    batch.push(holding.clone());
                }
            }
        }

        debug!(
            hits = resolution.cached.len(),
            misses = batch.len(),
            "Partitioned request"
        );

        if batch.is_empty() {
            return resolution;
        }

        let fresh = match self.analyzer.analyze(&batch).await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    analyzer = self.analyzer.name(),
                    error = %e,
                    "Analyzer failed, serving cached analyses only"
                );
                Vec::new()
            }
        };

        for record in &fresh {
            self.persist_in_background(batch.tuple_for(&record.stock), record.clone());
        }

        resolution.fresh = fresh;
        let unresolved = resolution.unresolved().len();
        if unresolved > 0 {
            info!(unresolved, "Some holdings have no analysis");
        }
        resolution
    }

    /// Schedules an upsert keyed by the record's own symbol.
    fn persist_in_background(&self, tuple: IdentifierTuple, record: AnalysisRecord) {
        let store = self.store.clone();
        self.spawner.spawn(
            async move {
                store.upsert(&tuple.key(), &tuple, &record).await;
            }
            .boxed(),
        );
    }
}
