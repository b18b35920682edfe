//! Instruction templates for summary and scoring requests

use crate::config::GenerationConfig;
use rankright_domain::traits::ChatRequest;
use rankright_domain::{Criterion, Ranking};

/// System message for summary requests
pub const SUMMARY_SYSTEM: &str = "You are an expert document analyst. Write clear, concise \
    summaries that capture the purpose and substance of a document.";

/// System message for scoring requests
pub const SCORING_SYSTEM: &str = "You are an expert document evaluator. Judge documents \
    objectively against the stated criterion and answer with a single JSON object in exactly \
    the requested shape.";

/// Prompt used to check connectivity
pub const CONNECTION_TEST_PROMPT: &str = "Hello, this is a connection test.";

/// Build the summary request for already-truncated content
pub fn summary_request(content: &str, config: &GenerationConfig) -> ChatRequest {
    let prompt = format!(
        "Summarize the following content in approximately {words} words.\n\
         Cover the main points, the key insights and the overall purpose of the document.\n\n\
         Content:\n---\n{content}\n---\n\nSummary:",
        words = config.summary_words,
        content = content,
    );

    ChatRequest::new(SUMMARY_SYSTEM, prompt)
        .with_max_tokens(config.summary_max_tokens)
        .with_temperature(config.summary_temperature)
}

/// Build the scoring request for one criterion over already-truncated content
pub fn score_request(content: &str, criterion: Criterion, config: &GenerationConfig) -> ChatRequest {
    let def = criterion.definition();

    let mut prompt = String::new();
    prompt.push_str("Evaluate the content below against a single quality criterion.\n\n");
    prompt.push_str(&format!("Criterion: {}\n", def.name));
    prompt.push_str(&format!("Description: {}\n", def.description));
    prompt.push_str(&format!("Rubric: {}\n\n", def.rubric));

    prompt.push_str("Content to evaluate:\n---\n");
    prompt.push_str(content);
    prompt.push_str("\n---\n\n");

    prompt.push_str(&format!(
        "Score the content from 0 to 100. Rankings follow the score: Green is {}-100, \
         Amber is {}-{}, Red is 0-{}.\n\n",
        Ranking::GREEN_THRESHOLD,
        Ranking::AMBER_THRESHOLD,
        Ranking::GREEN_THRESHOLD - 1,
        Ranking::AMBER_THRESHOLD - 1,
    ));
    prompt.push_str(OUTPUT_FORMAT);

    ChatRequest::new(SCORING_SYSTEM, prompt)
        .with_max_tokens(config.score_max_tokens)
        .with_temperature(config.score_temperature)
        .json()
}

/// Build the minimal request used by connection tests
pub fn connection_test_request() -> ChatRequest {
    ChatRequest::new("", CONNECTION_TEST_PROMPT).with_max_tokens(10)
}

const OUTPUT_FORMAT: &str = r#"Respond with a JSON object only, no additional text:
{
  "score": 72,
  "ranking": "Green|Amber|Red",
  "justification": "Why this score was given, citing the content",
  "key_findings": ["Finding 1", "Finding 2", "Finding 3"],
  "recommendation": "The most useful concrete change to raise the score"
}"#;
