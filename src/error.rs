//! Error types for textbook extraction.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage in which an unrecoverable failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Opening the document or reading its page tree
    Open,
    /// Reading the outline (table of contents)
    Outline,
    /// Reading or analyzing a single page (1-indexed)
    Page(u32),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Open => write!(f, "document open"),
            Stage::Outline => write!(f, "outline reading"),
            Stage::Page(n) => write!(f, "page {}", n),
        }
    }
}

/// Error types that can occur during extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version header is malformed.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// The document has more pages than the configured ceiling.
    #[error("Document has {pages} pages, exceeds limit of {limit}")]
    PageLimitExceeded { pages: u32, limit: u32 },

    /// Unrecoverable failure while extracting a document.
    #[error("Extraction of {document} failed during {stage}: {cause}")]
    ExtractionFailure {
        document: String,
        stage: Stage,
        cause: Box<Error>,
    },

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error while rendering a result.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Invalid extraction options.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Wrap an error as an [`Error::ExtractionFailure`] for a document and stage.
    ///
    /// Page-limit rejections and already-wrapped failures pass through unchanged.
    pub fn in_stage(self, document: impl Into<String>, stage: Stage) -> Self {
        match self {
            Error::PageLimitExceeded { .. } | Error::ExtractionFailure { .. } => self,
            cause => Error::ExtractionFailure {
                document: document.into(),
                stage,
                cause: Box::new(cause),
            },
        }
    }

    /// The stage that failed, if this is an extraction failure.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::ExtractionFailure { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
