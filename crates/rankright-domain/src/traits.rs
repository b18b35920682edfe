//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{Analysis, AnalysisId, AnalysisRecord, CriterionResult, Finalization};
use std::future::Future;

/// Trait for persisting analyses and their criterion results
///
/// Implemented by the infrastructure layer (rankright-store)
pub trait AnalysisStore {
    /// Error type for store operations
    type Error;

    /// Record a new pending analysis
    fn create(&mut self, analysis: &Analysis) -> Result<AnalysisId, Self::Error>;

    /// Attach one criterion result to a pending analysis
    fn append_criterion_result(
        &mut self,
        id: AnalysisId,
        result: &CriterionResult,
    ) -> Result<(), Self::Error>;

    /// Apply the single terminal mutation to a pending analysis
    fn finalize(&mut self, id: AnalysisId, finalization: &Finalization) -> Result<(), Self::Error>;

    /// Get an analysis and its results by ID
    fn get(&self, id: AnalysisId) -> Result<AnalysisRecord, Self::Error>;

    /// List analyses, newest first
    fn list(&self, limit: usize, offset: usize) -> Result<Vec<Analysis>, Self::Error>;
}

/// A single chat-completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Role instruction sent as the system message
    pub system: String,

    /// Instruction-plus-content sent as the user message
    pub prompt: String,

    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Ask the model to answer with a JSON object
    pub json_response: bool,
}

impl ChatRequest {
    /// Create a plain-text request with default sampling settings
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            max_tokens: 1000,
            temperature: 0.3,
            json_response: false,
        }
    }

    /// Set the token limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Request a JSON object response
    pub fn json(mut self) -> Self {
        self.json_response = true;
        self
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (rankright-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Run one chat completion and return the model's text
    fn complete(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
