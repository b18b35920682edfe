//! RankRight Content Extractor
//!
//! Turns an uploaded document or a web address into plain text for scoring.
//!
//! # Supported sources
//!
//! | Source | How text is obtained                                         |
//! |--------|--------------------------------------------------------------|
//! | PDF    | page text in document order                                  |
//! | DOCX   | `word/document.xml` paragraphs, table rows as `cell \| cell` |
//! | TXT    | UTF-8, UTF-16 or Windows-1252                                |
//! | URL    | one GET; HTML reduced to its main content                    |
//!
//! Every source either yields non-blank text or fails. Blank output is an
//! [`ExtractError::Extraction`], never an empty success.
//!
//! # Example Usage
//!
//! ```no_run
//! use rankright_extractor::{ContentExtractor, ExtractorConfig, Source};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractorConfig::default();
//! let source = Source::from_path(std::path::Path::new("policy.docx"), config.max_file_bytes)?;
//!
//! let extractor = ContentExtractor::new(config)?;
//! let content = extractor.extract(&source).await?;
//! println!("{} characters", content.char_count());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod document;
pub mod error;
pub mod source;
pub mod web;

pub use config::{ExtractorConfig, DEFAULT_MAX_FILE_BYTES};
pub use error::ExtractError;
pub use source::{Source, SUPPORTED_EXTENSIONS};

use tracing::{debug, info};

/// Plain text pulled from a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Normalized text, never blank
    pub text: String,
    /// Page title for web sources
    pub title: Option<String>,
}

impl ExtractedContent {
    /// Length of the text in characters
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Extracts text from validated sources
pub struct ContentExtractor {
    config: ExtractorConfig,
    client: reqwest::Client,
}

impl ContentExtractor {
    /// Create an extractor, building the HTTP client used for web pages
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractError> {
        config.validate().map_err(ExtractError::Validation)?;

        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ExtractError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Get the extractor configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract text from a source
    ///
    /// # Errors
    ///
    /// - `Extraction` when the document is corrupt or contains no text
    /// - `Network` when a web page cannot be fetched
    pub async fn extract(&self, source: &Source) -> Result<ExtractedContent, ExtractError> {
        info!(source = %source.descriptor(), kind = source.kind_label(), "Extracting content");

        let (raw, title) = match source {
            Source::Pdf { bytes, .. } => (document::pdf_text(bytes)?, None),
            Source::Docx { bytes, .. } => (document::docx_text(bytes)?, None),
            Source::Txt { bytes, .. } => (document::txt_text(bytes)?, None),
            Source::Url(url) => {
                let page = web::fetch_page(&self.client, url, self.config.fetch_timeout_secs).await?;
                (page.text, page.title)
            }
        };

        let text = normalize_text(&raw);
        if text.is_empty() {
            return Err(ExtractError::Extraction(format!(
                "no text found in {} '{}'",
                source.kind_label(),
                source.descriptor()
            )));
        }

        debug!(chars = text.chars().count(), "Extracted content");
        Ok(ExtractedContent { text, title })
    }
}

/// Trim trailing space on each line and collapse runs of blank lines
///
/// # Examples
///
/// ```
/// use rankright_extractor::normalize_text;
///
/// assert_eq!(normalize_text("  \r\nOne  \r\n\r\n\r\n\tTwo\n\n"), "One\n\n\tTwo");
/// assert_eq!(normalize_text(" \n\t "), "");
/// ```
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_blank = false;

    for line in raw.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push_str("\n\n");
        } else if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
        pending_blank = false;
    }

    out
}
