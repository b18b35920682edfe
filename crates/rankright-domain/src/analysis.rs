//! Analysis module - one evaluation run and its lifecycle records

use crate::criterion::CriterionResult;
use crate::error::ErrorKind;
use crate::stage::Stage;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for an analysis based on UUIDv7
///
/// UUIDv7 gives chronological sortability and needs no coordination, so
/// identifiers can be minted before the store ever sees the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnalysisId(u128);

impl AnalysisId {
    /// Generate a new UUIDv7-based AnalysisId
    ///
    /// # Examples
    ///
    /// ```
    /// use rankright_domain::AnalysisId;
    ///
    /// let id = AnalysisId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an AnalysisId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an AnalysisId from its hyphenated UUID string
    ///
    /// # Examples
    ///
    /// ```
    /// use rankright_domain::AnalysisId;
    ///
    /// let id = AnalysisId::new();
    /// let parsed = AnalysisId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s.trim())
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid analysis id '{}': {}", s, e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl std::str::FromStr for AnalysisId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// Lifecycle status of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisStatus {
    /// Created, pipeline still running
    Pending,
    /// All six criteria scored and aggregated
    Complete,
    /// Pipeline stopped on an unrecovered error
    Failed,
}

impl AnalysisStatus {
    /// Get the status name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Pending => "pending",
            AnalysisStatus::Complete => "complete",
            AnalysisStatus::Failed => "failed",
        }
    }

    /// Parse a status from its stored name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(AnalysisStatus::Pending),
            "complete" => Some(AnalysisStatus::Complete),
            "failed" => Some(AnalysisStatus::Failed),
            _ => None,
        }
    }

    /// Whether the analysis has reached a terminal status
    pub fn is_final(&self) -> bool {
        !matches!(self, AnalysisStatus::Pending)
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnalysisStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid analysis status: {}", s))
    }
}

/// Where and why a failed analysis stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// Stage that was running when the error occurred
    pub stage: Stage,

    /// Classification of the error
    pub kind: ErrorKind,

    /// Human-readable error message
    pub message: String,
}

/// One evaluation run over one input document or URL
///
/// Created when input is submitted, mutated exactly once when the pipeline
/// finishes or fails, and never updated afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Unique identifier
    pub id: AnalysisId,

    /// File name or URL the content came from
    pub source: String,

    /// Length of the extracted text in characters
    pub text_length: usize,

    /// Aggregate score (0-100), present only once complete
    pub overall_score: Option<u8>,

    /// Creation time in milliseconds since the Unix epoch
    pub created_at: u64,

    /// Lifecycle status
    pub status: AnalysisStatus,

    /// Model-generated summary of the content
    pub summary: Option<String>,

    /// Failure details for failed runs
    pub failure: Option<FailureRecord>,
}

impl Analysis {
    /// Create a new pending analysis for the given source descriptor
    ///
    /// # Examples
    ///
    /// ```
    /// use rankright_domain::{Analysis, AnalysisStatus};
    ///
    /// let analysis = Analysis::new("report.pdf");
    /// assert_eq!(analysis.status, AnalysisStatus::Pending);
    /// assert!(analysis.overall_score.is_none());
    /// ```
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            id: AnalysisId::new(),
            source: source.into(),
            text_length: 0,
            overall_score: None,
            created_at: now_millis(),
            status: AnalysisStatus::Pending,
            summary: None,
            failure: None,
        }
    }
}

/// An analysis together with its per-criterion results
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    /// The analysis row
    pub analysis: Analysis,

    /// Criterion results in the fixed criterion order
    pub results: Vec<CriterionResult>,
}

/// The single mutation applied to a pending analysis
#[derive(Debug, Clone, PartialEq)]
pub struct Finalization {
    /// Terminal status (`Complete` or `Failed`)
    pub status: AnalysisStatus,

    /// Aggregate score for complete runs
    pub overall_score: Option<u8>,

    /// Length of the extracted text in characters (0 if extraction failed)
    pub text_length: usize,

    /// Summary for complete runs
    pub summary: Option<String>,

    /// Failure details for failed runs
    pub failure: Option<FailureRecord>,
}

impl Finalization {
    /// Finalization for a run where all six criteria were scored
    pub fn complete(overall_score: u8, text_length: usize, summary: impl Into<String>) -> Self {
        Self {
            status: AnalysisStatus::Complete,
            overall_score: Some(overall_score),
            text_length,
            summary: Some(summary.into()),
            failure: None,
        }
    }

    /// Finalization for a run that stopped on an error
    pub fn failed(failure: FailureRecord, text_length: usize) -> Self {
        Self {
            status: AnalysisStatus::Failed,
            overall_score: None,
            text_length,
            summary: None,
            failure: Some(failure),
        }
    }
}

/// Current time in milliseconds since the Unix epoch
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
