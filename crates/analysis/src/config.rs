//! Coalescer configuration.

use analysis_core::DEFAULT_FRESHNESS_WINDOW;
use std::time::Duration;

/// Configuration for [`AnalysisCoalescer`](crate::AnalysisCoalescer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoalescerConfig {
    /// Maximum age of a cached analysis that still counts as a hit.
    pub freshness_window: Duration,
}

impl Default for CoalescerConfig {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
        }
    }
}

impl CoalescerConfig {
    /// Sets the freshness window.
    #[must_use]
    pub const fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ANALYSIS_FRESHNESS_WINDOW_SECS`: Freshness window in seconds (default: 3600)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Unparseable values fall back to the default.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let freshness_window = lookup("ANALYSIS_FRESHNESS_WINDOW_SECS")
            .and_then(|s| s.trim().parse().ok())
            .map_or(DEFAULT_FRESHNESS_WINDOW, Duration::from_secs);

        Self { freshness_window }
    }
}
