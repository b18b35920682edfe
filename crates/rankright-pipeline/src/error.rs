//! Error types for the evaluation pipeline

use rankright_domain::{AnalysisId, Classify, ErrorKind, FailureRecord, Stage};
use rankright_store::StoreError;
use thiserror::Error;

/// Errors returned by pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An analysis stopped on an error and was recorded as failed
    #[error("Analysis {id} failed while {stage}: {message}")]
    AnalysisFailed {
        /// Analysis that failed
        id: AnalysisId,
        /// Stage that was running
        stage: Stage,
        /// Classification of the underlying error
        kind: ErrorKind,
        /// Underlying error message
        message: String,
    },

    /// An analysis failed and its failure could not be stored
    ///
    /// The stored record may still be pending with partial results.
    #[error("Analysis {id} failed while {stage} ({message}) and the failure was not recorded: {source}")]
    FailureNotRecorded {
        /// Analysis that failed
        id: AnalysisId,
        /// Stage that was running
        stage: Stage,
        /// Underlying error message
        message: String,
        /// Error from the store when recording the failure
        #[source]
        source: StoreError,
    },

    /// Store error outside a running analysis
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    pub(crate) fn unrecorded(id: AnalysisId, failure: FailureRecord, source: StoreError) -> Self {
        PipelineError::FailureNotRecorded {
            id,
            stage: failure.stage,
            message: failure.message,
            source,
        }
    }

    pub(crate) fn failed(id: AnalysisId, failure: FailureRecord) -> Self {
        PipelineError::AnalysisFailed {
            id,
            stage: failure.stage,
            kind: failure.kind,
            message: failure.message,
        }
    }

    /// ID of the failed analysis, if one was created
    pub fn analysis_id(&self) -> Option<AnalysisId> {
        match self {
            PipelineError::AnalysisFailed { id, .. }
            | PipelineError::FailureNotRecorded { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Stage the failure happened in, if an analysis was running
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::AnalysisFailed { stage, .. }
            | PipelineError::FailureNotRecorded { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl Classify for PipelineError {
    fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::AnalysisFailed { kind, .. } => *kind,
            PipelineError::FailureNotRecorded { .. } => ErrorKind::Storage,
            PipelineError::Store(e) => e.kind(),
            PipelineError::Config(_) => ErrorKind::Validation,
        }
    }
}
