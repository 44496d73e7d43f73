//! # textbook-extract
//!
//! Structural extraction for educational PDFs.
//!
//! This library reads a textbook PDF and recovers its chapters, typed
//! content sections (reading material, exercises, teacher notes,
//! pre/post-reading prompts, in-text prompts) and individual questions
//! with their answer options, using only page geometry, font metadata and
//! text patterns.
//!
//! ## Quick Start
//!
//! ```no_run
//! use textbook_extract::{extract_file, render};
//!
//! fn main() -> textbook_extract::Result<()> {
//!     let result = extract_file("reader.pdf")?;
//!
//!     for chapter in &result.chapters {
//!         println!("{} (pages {}-{})", chapter.title, chapter.start_page, chapter.end_page);
//!     }
//!
//!     let json = render::to_json(&result, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Page source**: positioned text blocks and the outline, read with lopdf
//! - **Analyzer**: font size and weight, page-relative geometry
//! - **Classifier**: ordered pattern rules, then layout heuristics
//! - **Structure**: chapter and lesson page ranges from the outline
//! - **Questions**: numbered or interrogative lines, typed, with options
//! - **Deduplication**: exact-text filtering within a run

pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result, Stage};
pub use extract::{
    Classifier, Deduplicator, DocumentStructure, ErrorMode, ExtractOptions, Pipeline,
    QuestionDetector,
};
pub use model::{
    BlockType, Chapter, ContentBlock, ExtractionMetadata, ExtractionResult, Lesson, PageLayout,
    Question, QuestionType, Section, SectionType, TocEntry,
};
pub use parser::{PageSource, PdfSource};
pub use render::JsonFormat;

use std::io::Read;
use std::path::Path;

/// Extract the structure of a PDF file.
///
/// # Example
///
/// ```no_run
/// use textbook_extract::extract_file;
///
/// let result = extract_file("reader.pdf").unwrap();
/// println!("Questions: {}", result.questions.len());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<ExtractionResult> {
    extract_file_with_options(path, ExtractOptions::default())
}

/// Extract the structure of a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use textbook_extract::{extract_file_with_options, ExtractOptions};
///
/// let options = ExtractOptions::new()
///     .lenient()
///     .with_max_pages(200);
/// let result = extract_file_with_options("reader.pdf", options).unwrap();
/// ```
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<ExtractionResult> {
    let path = path.as_ref();
    let source =
        PdfSource::open(path).map_err(|e| e.in_stage(path.display().to_string(), Stage::Open))?;
    Pipeline::new(options).extract(&source)
}

/// Extract the structure of a PDF held in memory.
pub fn extract_bytes(data: &[u8]) -> Result<ExtractionResult> {
    extract_bytes_with_options(data, ExtractOptions::default())
}

/// Extract the structure of a PDF held in memory with custom options.
pub fn extract_bytes_with_options(
    data: &[u8],
    options: ExtractOptions,
) -> Result<ExtractionResult> {
    let source = PdfSource::from_bytes(data).map_err(|e| e.in_stage("<memory>", Stage::Open))?;
    Pipeline::new(options).extract(&source)
}

/// Extract the structure of a PDF read from a reader.
///
/// # Example
///
/// ```no_run
/// use textbook_extract::extract_reader;
/// use std::fs::File;
///
/// let file = File::open("reader.pdf").unwrap();
/// let result = extract_reader(file).unwrap();
/// ```
pub fn extract_reader<R: Read>(reader: R) -> Result<ExtractionResult> {
    let source =
        PdfSource::from_reader(reader).map_err(|e| e.in_stage("<reader>", Stage::Open))?;
    Pipeline::new(ExtractOptions::default()).extract(&source)
}

/// Extract a PDF file straight to JSON.
///
/// # Example
///
/// ```no_run
/// use textbook_extract::{to_json, JsonFormat};
///
/// let json = to_json("reader.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("reader.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let result = extract_file(path)?;
    render::to_json(&result, format)
}

/// Builder for extraction runs.
///
/// # Example
///
/// ```no_run
/// use textbook_extract::Extractor;
///
/// let summary = Extractor::new()
///     .with_max_pages(300)
///     .lenient()
///     .parallel()
///     .extract("reader.pdf")?
///     .to_summary();
/// # Ok::<(), textbook_extract::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ExtractOptions,
}

impl Extractor {
    /// Create a new extractor with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor from existing options.
    pub fn with_options(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Set the page ceiling.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.options = self.options.with_max_pages(max_pages);
        self
    }

    /// Skip unreadable pages instead of failing.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Read and classify pages in parallel.
    pub fn parallel(mut self) -> Self {
        self.options = self.options.with_parallel(true);
        self
    }

    /// Keep exact duplicates.
    pub fn without_dedup(mut self) -> Self {
        self.options = self.options.with_deduplicate(false);
        self
    }

    /// Extract a PDF file.
    pub fn extract<P: AsRef<Path>>(self, path: P) -> Result<Extraction> {
        let result = extract_file_with_options(path, self.options)?;
        Ok(Extraction { result })
    }

    /// Extract a PDF held in memory.
    pub fn extract_bytes(self, data: &[u8]) -> Result<Extraction> {
        let result = extract_bytes_with_options(data, self.options)?;
        Ok(Extraction { result })
    }

    /// Extract any page source.
    pub fn extract_source<S: PageSource + ?Sized>(self, source: &S) -> Result<Extraction> {
        let result = Pipeline::new(self.options).extract(source)?;
        Ok(Extraction { result })
    }
}

/// Result wrapper with rendering shortcuts.
#[derive(Debug, Clone)]
pub struct Extraction {
    result: ExtractionResult,
}

impl Extraction {
    /// The extraction result.
    pub fn result(&self) -> &ExtractionResult {
        &self.result
    }

    /// Take the extraction result.
    pub fn into_result(self) -> ExtractionResult {
        self.result
    }

    /// Render as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.result, format)
    }

    /// Render the summary report.
    pub fn to_summary(&self) -> String {
        render::to_summary(&self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_builder() {
        let extractor = Extractor::new()
            .with_max_pages(20)
            .lenient()
            .parallel()
            .without_dedup();
        assert_eq!(extractor.options.max_pages, 20);
        assert_eq!(extractor.options.error_mode, ErrorMode::Lenient);
        assert!(extractor.options.parallel);
        assert!(!extractor.options.deduplicate);
    }

    #[test]
    fn test_extract_bytes_rejects_non_pdf() {
        let err = extract_bytes(b"hello world").unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Open));
        assert!(err.to_string().contains("<memory>"));
    }

    #[test]
    fn test_missing_file_fails_at_open() {
        let err = extract_file("/nonexistent/reader.pdf").unwrap_err();
        assert!(matches!(
            err,
            Error::ExtractionFailure {
                stage: Stage::Open,
                ..
            }
        ));
    }
}
