//! Cache keys for analyses.
//!
//! An analysis is cacheable per [`IdentifierTuple`]. The key is the tuple's
//! fields joined with [`KEY_DELIMITER`] in the fixed order symbol, exchange,
//! horizon, risk profile, e.g. `AAPL#NASDAQ#SHORT_TERM#MODERATE`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    error::{AnalysisError, Result},
    types::{Exchange, Horizon, RiskProfile, Symbol},
};

/// Separator between key segments.
pub const KEY_DELIMITER: char = '#';

/// Derives the cache key for one identifier tuple.
///
/// Pure and total. The symbol is used verbatim, so keys are case-sensitive.
#[must_use]
pub fn build_key(
    symbol: &Symbol,
    exchange: Exchange,
    horizon: Horizon,
    risk_profile: RiskProfile,
) -> CacheKey {
    let d = KEY_DELIMITER;
    CacheKey(format!(
        "{symbol}{d}{}{d}{}{d}{}",
        exchange.as_str(),
        horizon.as_str(),
        risk_profile.as_str()
    ))
}

/// Derived cache key, unique per identifier tuple.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unit of cacheability: one symbol under one exchange, horizon and risk profile.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifierTuple {
    /// Symbol.
    pub symbol: Symbol,
    /// Exchange.
    pub exchange: Exchange,
    /// Horizon.
    pub horizon: Horizon,
    /// Risk profile.
    pub risk_profile: RiskProfile,
}

impl IdentifierTuple {
    /// Creates a new identifier tuple.
    #[must_use]
    pub fn new(
        symbol: impl Into<Symbol>,
        exchange: Exchange,
        horizon: Horizon,
        risk_profile: RiskProfile,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            horizon,
            risk_profile,
        }
    }

    /// Returns the cache key for this tuple.
    #[must_use]
    pub fn key(&self) -> CacheKey {
        build_key(&self.symbol, self.exchange, self.horizon, self.risk_profile)
    }

    /// Parses a key back into its tuple.
    ///
    /// Segments are split from the right: the last three are closed
    /// vocabularies, so everything before them is the symbol, even when the
    /// symbol itself contains the delimiter.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidParameter`] if the key has fewer than
    /// four segments or a trailing segment is not a known value.
    pub fn from_key(key: &CacheKey) -> Result<Self> {
        let mut parts = key.as_str().rsplitn(4, KEY_DELIMITER);
        let (Some(risk), Some(horizon), Some(exchange), Some(symbol)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AnalysisError::InvalidParameter(format!(
                "malformed cache key: {key}"
            )));
        };

        Ok(Self {
            symbol: Symbol::new(symbol),
            exchange: exchange.parse()?,
            horizon: horizon.parse()?,
            risk_profile: risk.parse()?,
        })
    }
}

impl fmt::Display for IdentifierTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let key = build_key(
            &Symbol::new("AAPL"),
            Exchange::Nasdaq,
            Horizon::ShortTerm,
            RiskProfile::Moderate,
        );
        assert_eq!(key.as_str(), "AAPL#NASDAQ#SHORT_TERM#MODERATE");
    }

    fn nse_key(symbol: &str) -> CacheKey {
        build_key(
            &Symbol::new(symbol),
            Exchange::Nse,
            Horizon::LongTerm,
            RiskProfile::Low,
        )
    }

    #[test]
    fn test_key_is_deterministic() {
        let symbols = ["RELIANCE", "TCS", "INFY"];
        let first: Vec<_> = symbols.iter().copied().map(nse_key).collect();
        let reversed: Vec<_> = symbols.iter().rev().copied().map(nse_key).collect();

        for (a, b) in first.iter().zip(reversed.iter().rev()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_every_tuple_field_changes_the_key() {
        let base = IdentifierTuple::new(
            "AAPL",
            Exchange::Nasdaq,
            Horizon::ShortTerm,
            RiskProfile::Low,
        );
        let mut seen = std::collections::HashSet::new();
        for exchange in Exchange::ALL {
            for horizon in Horizon::ALL {
                for risk in RiskProfile::ALL {
                    let tuple =
                        IdentifierTuple::new(base.symbol.clone(), *exchange, *horizon, *risk);
                    assert!(seen.insert(tuple.key()));
                }
            }
        }
        assert_eq!(seen.len(), 36);
    }

    #[test]
    fn test_key_is_case_sensitive() {
        let lower = IdentifierTuple::new(
            "aapl",
            Exchange::Nasdaq,
            Horizon::ShortTerm,
            RiskProfile::Low,
        );
        let upper = IdentifierTuple::new(
            "AAPL",
            Exchange::Nasdaq,
            Horizon::ShortTerm,
            RiskProfile::Low,
        );
        assert_ne!(lower.key(), upper.key());
    }

    #[test]
    fn test_from_key_inverts_build_key() {
        let tuple = IdentifierTuple::new(
            "M&M",
            Exchange::Bse,
            Horizon::MediumTerm,
            RiskProfile::High,
        );
        assert_eq!(IdentifierTuple::from_key(&tuple.key()).unwrap(), tuple);
    }

    #[test]
    fn test_from_key_with_delimiter_in_symbol() {
        let tuple = IdentifierTuple::new(
            "BRK#B",
            Exchange::Nyse,
            Horizon::LongTerm,
            RiskProfile::Low,
        );
        let key = tuple.key();
        assert_eq!(key.as_str(), "BRK#B#NYSE#LONG_TERM#LOW");
        let parsed = IdentifierTuple::from_key(&key).unwrap();
        assert_eq!(parsed.symbol.as_str(), "BRK#B");
    }

    #[test]
    fn test_from_key_rejects_malformed() {
        for raw in ["AAPL#NASDAQ", "AAPL#LSE#SHORT_TERM#LOW"] {
            let key = CacheKey(raw.into());
            assert!(IdentifierTuple::from_key(&key).is_err(), "{raw}");
        }
    }
}
