#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/analysis/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Generative-backend analyzer.
//!
//! This crate implements the [`Analyzer`] trait from `analysis-core` on top of
//! a chat model. Each miss batch becomes exactly one prompt and one backend
//! call; the reply is decoded with [`decode_records`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use analysis_llm::{LlmAnalyzer, OpenAiChatBackend, OpenAiConfig};
//!
//! let backend = OpenAiChatBackend::new(OpenAiConfig::from_env()?)?;
//! let analyzer = LlmAnalyzer::new(backend);
//! ```

use analysis_core::{AnalysisError, AnalysisRecord, Analyzer, MissBatch, Result};
use async_trait::async_trait;
use std::fmt::Debug;
use tracing::{debug, instrument};

/// Fail-closed decoding of backend output.
pub mod decode;
/// OpenAI-compatible chat backend.
pub mod openai;
/// Analyst prompt rendering.
pub mod prompt;

pub use decode::decode_records;
pub use openai::{OpenAiChatBackend, OpenAiConfig};

/// A text-in, text-out chat model.
#[async_trait]
pub trait ChatBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "OpenAI").
    fn name(&self) -> &str;

    /// Sends a single-turn prompt.
    ///
    /// Returns `Ok(None)` when the backend answered without any text.
    async fn complete(&self, prompt: &str) -> Result<Option<String>>;
}

/// [`Analyzer`] that prompts a [`ChatBackend`] once per miss batch.
#[derive(Debug, Clone)]
pub struct LlmAnalyzer<B> {
    backend: B,
}

impl<B: ChatBackend> LlmAnalyzer<B> {
    /// Create a new analyzer over the given backend.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: ChatBackend> Analyzer for LlmAnalyzer<B> {
    fn name(&self) -> &str {
        self.backend.name()
    }

    #[instrument(skip(self, batch), fields(backend = self.backend.name(), symbols = batch.len()))]
    async fn analyze(&self, batch: &MissBatch) -> Result<Vec<AnalysisRecord>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = prompt::render(batch);
        let text = self
            .backend
            .complete(&prompt)
            .await?
            .ok_or_else(|| AnalysisError::EmptyResponse(self.backend.name().to_string()))?;

        let records = decode_records(&text)?;
        debug!(records = records.len(), "Decoded analyses");
        Ok(records)
    }
}
