//! Summary and scoring operations over any provider

use crate::config::GenerationConfig;
use crate::parser::{parse_score_response, parse_summary};
use crate::prompt::{score_request, summary_request};
use crate::LlmError;
use rankright_domain::traits::LlmProvider;
use rankright_domain::{Criterion, CriterionResult};
use tracing::debug;

/// One-request-per-call front for the hosted model
///
/// # Examples
///
/// ```
/// use rankright_llm::{GenerationConfig, MockProvider, ModelGateway};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let gateway = ModelGateway::new(MockProvider::new("A short report."), GenerationConfig::default());
/// assert_eq!(gateway.summarize("Some text").await.unwrap(), "A short report.");
/// # });
/// ```
pub struct ModelGateway<L> {
    provider: L,
    config: GenerationConfig,
}

impl<L> ModelGateway<L>
where
    L: LlmProvider<Error = LlmError> + Sync,
{
    /// Create a gateway over `provider`
    pub fn new(provider: L, config: GenerationConfig) -> Self {
        Self { provider, config }
    }

    /// Generation settings in use
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Summarize `text` in one request
    pub async fn summarize(&self, text: &str) -> Result<String, LlmError> {
        let content = truncate_chars(text, self.config.max_content_chars);
        let request = summary_request(content, &self.config);
        debug!(prompt_chars = request.prompt.len(), "Requesting summary");

        let reply = self.provider.complete(&request).await?;
        debug!(reply_chars = reply.len(), "Summary received");
        parse_summary(&reply)
    }

    /// Score `text` against one criterion in one request
    pub async fn score(&self, text: &str, criterion: Criterion) -> Result<CriterionResult, LlmError> {
        let content = truncate_chars(text, self.config.max_content_chars);
        let request = score_request(content, criterion, &self.config);
        debug!(
            criterion = criterion.key(),
            prompt_chars = request.prompt.len(),
            "Requesting score"
        );

        let reply = self.provider.complete(&request).await?;
        debug!(criterion = criterion.key(), reply_chars = reply.len(), "Score received");
        parse_score_response(criterion, &reply)
    }
}

/// First `max_chars` characters of `text`, cut on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
