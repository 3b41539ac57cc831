//! Request-side types for stock analysis.
//!
//! This module defines the vocabulary a caller uses to ask for an analysis:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`Exchange`] - Listing exchange
//! - [`Horizon`] - Investment horizon the analysis is written for
//! - [`RiskProfile`] - Investor risk appetite
//! - [`Holding`] - A symbol with an optional average buy price
//! - [`AnalysisRequest`] - A basket of holdings sharing exchange, horizon and risk profile
//!
//! The enums carry explicit string codecs (`as_str` / [`FromStr`]) because
//! their textual form is part of the cache key and of the persisted row.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// A trading symbol/ticker.
///
/// Symbols are kept exactly as given; cache keys are case-sensitive, so
/// `"aapl"` and `"AAPL"` are distinct symbols.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the symbol is empty or only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Implements `as_str`, `ALL`, [`fmt::Display`] and [`FromStr`] for a
/// closed request enum whose textual form is SCREAMING_SNAKE_CASE.
macro_rules! string_codec {
    ($ty:ident, $what:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the canonical textual form used in cache keys and storage.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = AnalysisError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(AnalysisError::InvalidParameter(format!(
                        "unknown {}: {other}",
                        $what
                    ))),
                }
            }
        }
    };
}

/// Listing exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Exchange {
    /// National Stock Exchange of India.
    Nse,
    /// Bombay Stock Exchange.
    Bse,
    /// New York Stock Exchange.
    Nyse,
    /// NASDAQ.
    Nasdaq,
}

string_codec!(Exchange, "exchange", {
    Nse => "NSE",
    Bse => "BSE",
    Nyse => "NYSE",
    Nasdaq => "NASDAQ",
});

/// Investment horizon the analysis is written for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Horizon {
    /// Weeks to a few months.
    ShortTerm,
    /// Several months to a couple of years.
    MediumTerm,
    /// Multi-year holding period.
    LongTerm,
}

string_codec!(Horizon, "horizon", {
    ShortTerm => "SHORT_TERM",
    MediumTerm => "MEDIUM_TERM",
    LongTerm => "LONG_TERM",
});

/// Investor risk appetite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskProfile {
    /// Capital preservation first.
    Low,
    /// Balanced.
    Moderate,
    /// Growth-seeking, tolerant of drawdowns.
    High,
}

string_codec!(RiskProfile, "risk profile", {
    Low => "LOW",
    Moderate => "MODERATE",
    High => "HIGH",
});

/// A symbol held in a portfolio, with an optional average buy price.
///
/// The price is context for the analyst prompt only; it never takes part in
/// the cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Holding {
    /// Held symbol.
    pub symbol: Symbol,
    /// Average buy price as supplied by the caller.
    pub avg_buy_price: Option<String>,
}

impl Holding {
    /// Creates a holding without a buy price.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            avg_buy_price: None,
        }
    }

    /// Sets the average buy price.
    #[must_use]
    pub fn with_avg_buy_price(mut self, price: impl Into<String>) -> Self {
        self.avg_buy_price = Some(price.into());
        self
    }
}

impl From<&str> for Holding {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for Holding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.avg_buy_price {
            Some(price) => write!(f, "{} (avg buy price {price})", self.symbol),
            None => write!(f, "{}", self.symbol),
        }
    }
}

/// A basket of holdings to analyse under one exchange, horizon and risk profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Exchange shared by every holding.
    pub exchange: Exchange,
    /// Holdings to analyse. Duplicates are resolved independently.
    pub holdings: Vec<Holding>,
    /// Analysis horizon.
    pub horizon: Horizon,
    /// Risk profile.
    pub risk_profile: RiskProfile,
}

impl AnalysisRequest {
    /// Creates a request from plain symbols.
    #[must_use]
    pub fn new<I, S>(
        exchange: Exchange,
        symbols: I,
        horizon: Horizon,
        risk_profile: RiskProfile,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        Self {
            exchange,
            holdings: symbols.into_iter().map(Holding::new).collect(),
            horizon,
            risk_profile,
        }
    }

    /// Creates a request from holdings.
    #[must_use]
    pub const fn from_holdings(
        exchange: Exchange,
        holdings: Vec<Holding>,
        horizon: Horizon,
        risk_profile: RiskProfile,
    ) -> Self {
        Self {
            exchange,
            holdings,
            horizon,
            risk_profile,
        }
    }

    /// Returns true if the request names no holdings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}
