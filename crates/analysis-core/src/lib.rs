#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/analysis/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for cached stock analysis.
//!
//! This crate provides the foundational abstractions shared by the store
//! backends, the generative analyzer, and the coalescer:
//!
//! - [`build_key`](key::build_key) - Deterministic cache key per identifier tuple
//! - [`AnalysisRecord`](record::AnalysisRecord) - The structured analysis per stock
//! - [`AnalysisStore`](store::AnalysisStore) - Durable storage with fresh lookups
//! - [`Analyzer`](analyzer::Analyzer) - The expensive batched computation
//! - [`TaskSpawner`](spawn::TaskSpawner) - Background task submission
//! - [`Clock`](clock::Clock) - Time source for store timestamps

/// Analyzer trait and miss batches.
pub mod analyzer;
/// Clock abstraction.
pub mod clock;
/// Error types for analysis operations.
pub mod error;
/// Cache key derivation.
pub mod key;
/// The analysis record and its vocabularies.
pub mod record;
/// Background task spawners.
pub mod spawn;
/// Store trait and cache entries.
pub mod store;
/// Request-side types (Symbol, Exchange, Horizon, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use analyzer::{Analyzer, MissBatch};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AnalysisError, Result};
pub use key::{CacheKey, IdentifierTuple, KEY_DELIMITER, build_key};
pub use record::{
    AnalysisRecord, FundamentalImpact, MarketReaction, MoatTrend, NewsType, RecommendedAction,
    RiskLevel, Sentiment, TimeHorizonImpact, Trend,
};
pub use spawn::{TaskSpawner, TokioSpawner, TrackingSpawner};
pub use store::{AnalysisStore, CacheEntry, DEFAULT_FRESHNESS_WINDOW, is_fresh};
pub use types::{AnalysisRequest, Exchange, Holding, Horizon, RiskProfile, Symbol};
