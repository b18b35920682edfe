//! Stage module - the evaluation state machine

use crate::criterion::Criterion;
use std::fmt;

/// Stage of the evaluation pipeline for one analysis
///
/// Runs `Pending → Extracting → Summarizing → Scoring(1..6) → Aggregating →
/// Complete`; any stage may move to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Analysis created, nothing run yet
    Pending,

    /// Pulling text out of the document or web page
    Extracting,

    /// Asking the model for a summary
    Summarizing,

    /// Asking the model to score one criterion
    Scoring(Criterion),

    /// Computing the overall score
    Aggregating,

    /// All stages finished
    Complete,

    /// Stopped on an unrecovered error
    Failed,
}

impl Stage {
    /// Get the stage name as stored (scoring stages carry the criterion key)
    pub fn as_str(&self) -> String {
        match self {
            Stage::Pending => "pending".to_string(),
            Stage::Extracting => "extracting".to_string(),
            Stage::Summarizing => "summarizing".to_string(),
            Stage::Scoring(criterion) => format!("scoring:{}", criterion.key()),
            Stage::Aggregating => "aggregating".to_string(),
            Stage::Complete => "complete".to_string(),
            Stage::Failed => "failed".to_string(),
        }
    }

    /// Parse a stage from its stored name
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(key) = s.strip_prefix("scoring:") {
            return Criterion::parse(key).map(Stage::Scoring);
        }

        match s {
            "pending" => Some(Stage::Pending),
            "extracting" => Some(Stage::Extracting),
            "summarizing" => Some(Stage::Summarizing),
            "aggregating" => Some(Stage::Aggregating),
            "complete" => Some(Stage::Complete),
            "failed" => Some(Stage::Failed),
            _ => None,
        }
    }

    /// The stage that follows this one on success
    pub fn next(&self) -> Option<Self> {
        match self {
            Stage::Pending => Some(Stage::Extracting),
            Stage::Extracting => Some(Stage::Summarizing),
            Stage::Summarizing => Some(Stage::Scoring(Criterion::ALL[0])),
            Stage::Scoring(criterion) => Some(
                criterion
                    .next()
                    .map(Stage::Scoring)
                    .unwrap_or(Stage::Aggregating),
            ),
            Stage::Aggregating => Some(Stage::Complete),
            Stage::Complete | Stage::Failed => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Scoring(criterion) => write!(f, "scoring ({})", criterion.name()),
            other => f.write_str(&other.as_str()),
        }
    }
}
