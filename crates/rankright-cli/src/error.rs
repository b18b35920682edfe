//! Error types for the CLI application.

use rankright_domain::{Classify, ErrorKind, Stage};
use rankright_extractor::ExtractError;
use rankright_llm::LlmError;
use rankright_pipeline::PipelineError;
use rankright_store::StoreError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis error
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Storage error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Model gateway error
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Input could not be read
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Classify for CliError {
    fn kind(&self) -> ErrorKind {
        match self {
            CliError::Pipeline(e) => e.kind(),
            CliError::Store(e) => e.kind(),
            CliError::Llm(e) => e.kind(),
            CliError::Extract(e) => e.kind(),
            CliError::Io(_) => ErrorKind::Storage,
            CliError::Config(_)
            | CliError::Serialization(_)
            | CliError::Toml(_)
            | CliError::InvalidInput(_) => ErrorKind::Validation,
        }
    }
}

impl CliError {
    /// Steps the user can take to resolve this error
    pub fn guidance(&self) -> &'static [&'static str] {
        let kind = self.kind();
        if kind == ErrorKind::Network && self.is_page_fetch() {
            return PAGE_FETCH_GUIDANCE;
        }
        guidance(kind)
    }

    /// Raised while reading the input rather than talking to the model
    fn is_page_fetch(&self) -> bool {
        match self {
            CliError::Extract(_) => true,
            CliError::Pipeline(e) => e.stage() == Some(Stage::Extracting),
            _ => false,
        }
    }
}

const PAGE_FETCH_GUIDANCE: &[&str] = &[
    "Check that the URL is correct and the site is reachable from this machine",
    "Some sites block automated clients; save the page and analyze the file with --file",
];

/// Steps the user can take to resolve an error of the given kind
pub fn guidance(kind: ErrorKind) -> &'static [&'static str] {
    match kind {
        ErrorKind::Validation => &[
            "Check the input: files must be PDF, DOCX or TXT under the size limit",
            "URLs must use http or https",
        ],
        ErrorKind::Extraction => &[
            "The input contained no readable text",
            "Scanned PDFs need OCR before they can be analyzed",
        ],
        ErrorKind::Network => &[
            "Run `rankright check` to test the connection to the model endpoint",
            "If the resource uses a firewall, add this machine's public IP under \
             Networking > Firewalls and virtual networks",
            "If it is restricted to selected virtual networks, connect from an allowed \
             network or enable the private endpoint settings",
            "For private endpoints set AZURE_OPENAI_USE_PRIVATE_ENDPOINT=true with \
             AZURE_OPENAI_PRIVATE_IP and AZURE_OPENAI_PRIVATE_FQDN",
        ],
        ErrorKind::Auth => &[
            "Check AZURE_OPENAI_API_KEY and AZURE_OPENAI_ENDPOINT",
            "Check that AZURE_OPENAI_DEPLOYMENT_NAME matches a deployment on the resource",
        ],
        ErrorKind::RateLimit => &[
            "The model's quota was exceeded; wait and try again",
            "Raise the deployment's tokens-per-minute limit if this keeps happening",
        ],
        ErrorKind::MalformedResponse => &[
            "The model returned an unexpected reply; try again",
            "Use a deployment that supports JSON response format",
        ],
        ErrorKind::NotFound => &["Run `rankright history` to list analysis IDs"],
        ErrorKind::Storage => &[
            "Check that the database file is writable",
            "Use --db to point at a different database",
        ],
    }
}
