//! Analyzer trait for computing fresh analyses.
//!
//! An [`Analyzer`] wraps the expensive generative backend. It is always called
//! with one [`MissBatch`]: every holding whose analysis was not servable from
//! cache, sharing a single exchange, horizon and risk profile.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    key::IdentifierTuple,
    record::AnalysisRecord,
    types::{Exchange, Holding, Horizon, RiskProfile, Symbol},
};

/// Holdings that need a fresh analysis, with their shared context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissBatch {
    /// Shared exchange.
    pub exchange: Exchange,
    /// Shared horizon.
    pub horizon: Horizon,
    /// Shared risk profile.
    pub risk_profile: RiskProfile,
    /// Holdings to analyse, in request order.
    pub holdings: Vec<Holding>,
}

impl MissBatch {
    /// Creates an empty batch for the given context.
    #[must_use]
    pub const fn new(exchange: Exchange, horizon: Horizon, risk_profile: RiskProfile) -> Self {
        Self {
            exchange,
            horizon,
            risk_profile,
            holdings: Vec::new(),
        }
    }

    /// Adds a holding to the batch.
    pub fn push(&mut self, holding: Holding) {
        self.holdings.push(holding);
    }

    /// Returns the number of holdings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    /// Returns true if the batch holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Returns the symbols in the batch.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.holdings.iter().map(|h| &h.symbol)
    }

    /// Returns the identifier tuple for `symbol` under this batch's context.
    #[must_use]
    pub fn tuple_for(&self, symbol: &Symbol) -> IdentifierTuple {
        IdentifierTuple::new(
            symbol.clone(),
            self.exchange,
            self.horizon,
            self.risk_profile,
        )
    }

    /// Returns the identifier tuples for every holding.
    #[must_use]
    pub fn tuples(&self) -> Vec<IdentifierTuple> {
        self.symbols().map(|s| self.tuple_for(s)).collect()
    }
}

/// Trait for the expensive analysis computation.
///
/// Implementations should return one record per holding but may return fewer
/// when the backend produced partial output. Errors are degraded by the caller
/// to "no fresh records"; they never fail a request.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Returns the name of this analyzer (e.g., "OpenAI").
    fn name(&self) -> &str;

    /// Computes analyses for every holding in the batch with a single backend call.
    async fn analyze(&self, batch: &MissBatch) -> Result<Vec<AnalysisRecord>>;
}
