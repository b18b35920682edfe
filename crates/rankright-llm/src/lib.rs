//! RankRight Model Gateway
//!
//! Talks to the hosted chat-completion model that summarizes documents and
//! scores them against the six criteria.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from
//! `rankright-domain`, plus [`ModelGateway`], which turns a provider into the
//! two operations the pipeline needs: `summarize` and `score`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `AzureOpenAiProvider`: Azure OpenAI chat completions over HTTPS
//!
//! # Examples
//!
//! ```
//! use rankright_llm::MockProvider;
//! use rankright_domain::traits::{ChatRequest, LlmProvider};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let provider = MockProvider::new("Hello from the model!");
//! let reply = provider.complete(&ChatRequest::new("system", "prompt")).await.unwrap();
//! assert_eq!(reply, "Hello from the model!");
//! # });
//! ```

#![warn(missing_docs)]

pub mod azure;
pub mod config;
pub mod gateway;
pub mod parser;
pub mod prompt;

use rankright_domain::traits::{ChatRequest, LlmProvider};
use rankright_domain::{Classify, ErrorKind};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub use azure::AzureOpenAiProvider;
pub use config::{GatewayConfig, GenerationConfig};
pub use gateway::ModelGateway;

/// Errors that can occur during model operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Gateway settings are missing or unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credentials rejected or deployment unknown
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Transport failure, timeout, or non-success HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// Quota exceeded
    #[error("Rate limit exceeded{}", retry_hint(.retry_after))]
    RateLimit {
        /// Seconds the service asked us to wait, if it said
        retry_after: Option<u64>,
    },

    /// Model output did not have the expected shape
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(" (retry after {}s)", secs),
        None => String::new(),
    }
}

impl Classify for LlmError {
    fn kind(&self) -> ErrorKind {
        match self {
            LlmError::Config(_) | LlmError::Auth(_) => ErrorKind::Auth,
            LlmError::Network(_) => ErrorKind::Network,
            LlmError::RateLimit { .. } => ErrorKind::RateLimit,
            LlmError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }
}

/// Mock LLM provider for deterministic testing
///
/// Replies are chosen by the first registered pattern that the request's
/// prompt contains; unmatched requests get the default reply. No network
/// calls are made.
///
/// # Examples
///
/// ```
/// use rankright_llm::{LlmError, MockProvider};
///
/// let mut provider = MockProvider::new("fallback");
/// provider.add_response("Criterion: Clarity", r#"{"score": 90, "justification": "clear"}"#);
/// provider.add_error("Summarize", LlmError::Network("HTTP 503".to_string()));
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, Result<String, LlmError>)>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed reply for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with `response` to any prompt containing `pattern`
    pub fn add_response(&mut self, pattern: impl Into<String>, response: impl Into<String>) {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((pattern.into(), Ok(response.into())));
    }

    /// Fail with `error` for any prompt containing `pattern`
    pub fn add_error(&mut self, pattern: impl Into<String>, error: LlmError) {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((pattern.into(), Err(error)));
    }

    /// Number of completions requested so far
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn respond(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let rules = self.rules.lock().unwrap_or_else(PoisonError::into_inner);
        rules
            .iter()
            .find(|(pattern, _)| request.prompt.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Ok(self.default_response.clone()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn complete(&self, request: &ChatRequest) -> Result<String, Self::Error> {
        self.respond(request)
    }
}
