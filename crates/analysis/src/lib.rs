#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/analysis/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cached, coalesced stock analysis.
//!
//! This crate re-exports the core types and store backends, and provides the
//! [`AnalysisCoalescer`] that serves requests from cache and sends every miss
//! to the [`Analyzer`] in a single batch.
//!
//! # Features
//!
//! - `llm` - Chat-model analyzer over an OpenAI-compatible API
//! - `cache-sqlite` - SQLite-based store
//!
//! # Example
//!
//! ```rust,ignore
//! use analysis::{
//!     AnalysisCoalescer, CacheStore, Exchange, Horizon, LlmAnalyzer, OpenAiChatBackend,
//!     OpenAiConfig, RiskProfile, SqliteCache,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> analysis::Result<()> {
//!     let store = CacheStore::new(Arc::new(SqliteCache::new("analysis.db")?));
//!     let backend = OpenAiChatBackend::new(OpenAiConfig::from_env()?)?;
//!     let coalescer = AnalysisCoalescer::new(store, Arc::new(LlmAnalyzer::new(backend)));
//!
//!     let records = coalescer
//!         .resolve_symbols(Exchange::Nasdaq, ["AAPL", "MSFT"], Horizon::ShortTerm, RiskProfile::Moderate)
//!         .await;
//!     println!("{records:#?}");
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use analysis_core::*;

// Store implementations
#[cfg(feature = "cache-sqlite")]
pub use analysis_cache::SqliteCache;
pub use analysis_cache::{InMemoryCache, NoopCache};

// Analyzers
#[cfg(feature = "llm")]
pub use analysis_llm::{ChatBackend, LlmAnalyzer, OpenAiChatBackend, OpenAiConfig};

mod cache_store;
mod coalescer;
mod config;

pub use cache_store::CacheStore;
pub use coalescer::{AnalysisCoalescer, Resolution};
pub use config::CoalescerConfig;
