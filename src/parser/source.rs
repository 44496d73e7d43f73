//! The page-level view of a document that extraction runs against.

use crate::error::Result;
use crate::model::{PageLayout, TocEntry};

/// A document that yields positioned text page by page.
///
/// Implementations must be shareable across threads so pages can be read
/// in parallel when requested.
pub trait PageSource: Sync {
    /// Label used in errors and metadata (usually the file path).
    fn name(&self) -> &str;

    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Read the positioned text blocks of one page (1-indexed).
    fn page(&self, number: u32) -> Result<PageLayout>;

    /// Flattened table of contents, possibly empty.
    fn outline(&self) -> Result<Vec<TocEntry>>;

    /// Document title, if known.
    fn title(&self) -> Option<String> {
        None
    }

    /// Document author, if known.
    fn author(&self) -> Option<String> {
        None
    }

    /// Format version, if known.
    fn version(&self) -> Option<String> {
        None
    }
}

impl<S: PageSource + ?Sized> PageSource for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn page_count(&self) -> u32 {
        (**self).page_count()
    }

    fn page(&self, number: u32) -> Result<PageLayout> {
        (**self).page(number)
    }

    fn outline(&self) -> Result<Vec<TocEntry>> {
        (**self).outline()
    }

    fn title(&self) -> Option<String> {
        (**self).title()
    }

    fn author(&self) -> Option<String> {
        (**self).author()
    }

    fn version(&self) -> Option<String> {
        (**self).version()
    }
}
