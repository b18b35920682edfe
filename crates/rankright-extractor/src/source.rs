//! Input sources and their validation

use crate::error::ExtractError;
use std::fmt;
use std::path::Path;
use url::Url;

/// File extensions accepted for upload
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];

/// A validated input to extract text from
#[derive(Clone, PartialEq, Eq)]
pub enum Source {
    /// PDF document
    Pdf {
        /// Original file name
        name: String,
        /// File contents
        bytes: Vec<u8>,
    },
    /// Word (Office Open XML) document
    Docx {
        /// Original file name
        name: String,
        /// File contents
        bytes: Vec<u8>,
    },
    /// Plain text file
    Txt {
        /// Original file name
        name: String,
        /// File contents
        bytes: Vec<u8>,
    },
    /// Web page
    Url(Url),
}

impl Source {
    /// Classify an in-memory file by its extension
    ///
    /// # Errors
    ///
    /// `Validation` when the extension is missing or unsupported, or the
    /// file is larger than `max_bytes`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rankright_extractor::Source;
    ///
    /// let source = Source::from_file("Notes.TXT", b"hello".to_vec(), 1024).unwrap();
    /// assert_eq!(source.kind_label(), "TXT");
    /// assert!(Source::from_file("slides.pptx", Vec::new(), 1024).is_err());
    /// ```
    pub fn from_file(
        name: impl Into<String>,
        bytes: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, ExtractError> {
        let name = name.into();
        let extension = extension_of(&name)?;

        if bytes.len() > max_bytes {
            return Err(too_large(&name, bytes.len() as u64, max_bytes));
        }

        match extension.as_str() {
            "pdf" => Ok(Source::Pdf { name, bytes }),
            "docx" => Ok(Source::Docx { name, bytes }),
            "txt" => Ok(Source::Txt { name, bytes }),
            _ => Err(unsupported(&name, &extension)),
        }
    }

    /// Read a file from disk and classify it
    pub fn from_path(path: &Path, max_bytes: usize) -> Result<Self, ExtractError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ExtractError::Validation(format!("{} is not a file", path.display())))?;

        // Reject on shape before touching the contents
        extension_of(&name)?;
        let io_err = |source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        };
        let len = std::fs::metadata(path).map_err(io_err)?.len();
        if len > max_bytes as u64 {
            return Err(too_large(&name, len, max_bytes));
        }

        let bytes = std::fs::read(path).map_err(io_err)?;
        Self::from_file(name, bytes, max_bytes)
    }

    /// Parse a web address, defaulting to `https://` when no scheme is given
    ///
    /// # Examples
    ///
    /// ```
    /// use rankright_extractor::Source;
    ///
    /// let source = Source::from_url("example.com/policy").unwrap();
    /// assert_eq!(source.descriptor(), "https://example.com/policy");
    /// assert!(Source::from_url("ftp://example.com/file").is_err());
    /// ```
    pub fn from_url(input: &str) -> Result<Self, ExtractError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ExtractError::Validation("URL is empty".to_string()));
        }

        let candidate = if input.contains("://") {
            input.to_string()
        } else {
            format!("https://{}", input)
        };

        let url = Url::parse(&candidate)
            .map_err(|e| ExtractError::Validation(format!("invalid URL '{}': {}", input, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ExtractError::Validation(format!(
                "unsupported URL scheme '{}'; use http or https",
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(ExtractError::Validation(format!("URL '{}' has no host", input)));
        }

        Ok(Source::Url(url))
    }

    /// File name or URL, as recorded on the analysis
    pub fn descriptor(&self) -> &str {
        match self {
            Source::Pdf { name, .. } | Source::Docx { name, .. } | Source::Txt { name, .. } => name,
            Source::Url(url) => url.as_str(),
        }
    }

    /// Short label for the source type
    pub fn kind_label(&self) -> &'static str {
        match self {
            Source::Pdf { .. } => "PDF",
            Source::Docx { .. } => "DOCX",
            Source::Txt { .. } => "TXT",
            Source::Url(_) => "URL",
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Pdf { name, bytes } | Source::Docx { name, bytes } | Source::Txt { name, bytes } => f
                .debug_struct(self.kind_label())
                .field("name", name)
                .field("bytes", &bytes.len())
                .finish(),
            Source::Url(url) => f.debug_tuple("Url").field(&url.as_str()).finish(),
        }
    }
}

fn extension_of(name: &str) -> Result<String, ExtractError> {
    let extension = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .ok_or_else(|| {
            ExtractError::Validation(format!(
                "'{}' has no file extension; supported types are {}",
                name,
                SUPPORTED_EXTENSIONS.join(", ")
            ))
        })?;

    if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(unsupported(name, &extension))
    }
}

fn unsupported(name: &str, extension: &str) -> ExtractError {
    ExtractError::Validation(format!(
        "unsupported file type '.{}' for '{}'; supported types are {}",
        extension,
        name,
        SUPPORTED_EXTENSIONS.join(", ")
    ))
}

fn too_large(name: &str, len: u64, max_bytes: usize) -> ExtractError {
    ExtractError::Validation(format!(
        "'{}' is {} bytes, larger than the {} byte limit",
        name, len, max_bytes
    ))
}
