#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/analysis/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Store backends for cached stock analyses.
//!
//! This crate provides implementations of the [`AnalysisStore`] trait from `analysis-core`:
//!
//! - [`SqliteCache`] - Persistent SQLite-based store (default, requires `sqlite` feature)
//! - [`InMemoryCache`] - Simple in-memory store for testing
//! - [`NoopCache`] - No-op store that doesn't keep anything

/// In-memory store implementation.
pub mod memory;
/// No-op store implementation.
pub mod noop;

/// SQLite-based store implementation.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the trait for convenience
pub use analysis_core::AnalysisStore;

// Re-export implementations
pub use memory::InMemoryCache;
pub use noop::NoopCache;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCache;
