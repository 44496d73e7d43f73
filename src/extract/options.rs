//! Extraction options and configuration.

use crate::error::{Error, Result};

/// Default page ceiling.
pub const DEFAULT_MAX_PAGES: u32 = 500;

/// Options for an extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Documents with more pages are rejected before any page is read
    pub max_pages: u32,

    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to drop blocks whose exact text was already recorded
    pub deduplicate: bool,

    /// Whether to read and classify pages in parallel
    pub parallel: bool,

    /// Whether to link questions to the first exercise on their page
    pub link_questions: bool,
}

impl ExtractOptions {
    /// Create new extraction options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page ceiling.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip unreadable pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable deduplication.
    pub fn with_deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }

    /// Enable or disable parallel page processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enable or disable question-to-exercise linking.
    pub fn with_link_questions(mut self, link: bool) -> Self {
        self.link_questions = link;
        self
    }

    /// Check the options for values that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(Error::Config("max_pages must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            error_mode: ErrorMode::Strict,
            deduplicate: true,
            parallel: false,
            link_questions: true,
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the run on any page error
    #[default]
    Strict,
    /// Record a warning and skip the page
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .lenient()
            .with_max_pages(50)
            .with_deduplicate(false)
            .with_parallel(true);

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.max_pages, 50);
        assert!(!options.deduplicate);
        assert!(options.parallel);
        assert!(options.link_questions);
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.max_pages, 500);
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(options.deduplicate);
        assert!(!options.parallel);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let options = ExtractOptions::new().with_max_pages(0);
        assert!(matches!(options.validate(), Err(Error::Config(_))));
    }
}
