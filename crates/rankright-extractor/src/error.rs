//! Error types for content extraction

use rankright_domain::{Classify, ErrorKind};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning a source into text
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Input shape rejected before any parsing
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Input was accepted but yielded no usable text
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Web page could not be fetched
    #[error("Network error: {0}")]
    Network(String),

    /// File could not be read from disk
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Classify for ExtractError {
    fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::Validation(_) | ExtractError::Io { .. } => ErrorKind::Validation,
            ExtractError::Extraction(_) => ErrorKind::Extraction,
            ExtractError::Network(_) => ErrorKind::Network,
        }
    }
}
