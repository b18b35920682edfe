//! Shared failure taxonomy
//!
//! Each infrastructure crate keeps its own error enum and classifies it into
//! one [`ErrorKind`], so the pipeline can record failures and front ends can
//! pick a user-facing message without knowing every concrete error type.

use std::fmt;

/// Classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input shape; user-correctable, retrying the same input won't help
    Validation,

    /// Input was readable but yielded no usable text
    Extraction,

    /// Connectivity, timeout, firewall or non-success HTTP status; may retry
    Network,

    /// Credentials or deployment configuration rejected
    Auth,

    /// Quota exceeded; wait before retrying
    RateLimit,

    /// Model output could not be parsed into the expected shape
    MalformedResponse,

    /// Unknown identifier
    NotFound,

    /// Local persistence failure
    Storage,
}

impl ErrorKind {
    /// Every kind, for exhaustive iteration
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::Validation,
        ErrorKind::Extraction,
        ErrorKind::Network,
        ErrorKind::Auth,
        ErrorKind::RateLimit,
        ErrorKind::MalformedResponse,
        ErrorKind::NotFound,
        ErrorKind::Storage,
    ];

    /// Get the kind name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Extraction => "extraction",
            ErrorKind::Network => "network",
            ErrorKind::Auth => "auth",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Storage => "storage",
        }
    }

    /// Parse a kind from its stored name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Whether the same request may succeed if simply tried again later
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::RateLimit)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every error type that crosses a crate boundary
pub trait Classify {
    /// The taxonomy bucket this error falls into
    fn kind(&self) -> ErrorKind;
}
