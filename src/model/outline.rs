//! Outline-level types: table-of-contents entries, chapters and lessons.

use serde::{Deserialize, Serialize};

/// One flattened table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Nesting level (1 = top level)
    pub level: u8,
    /// Entry title
    pub title: String,
    /// Target page (1-indexed), if the destination could be resolved
    pub page: Option<u32>,
}

impl TocEntry {
    /// Create a new entry.
    pub fn new(level: u8, title: impl Into<String>, page: Option<u32>) -> Self {
        Self {
            level,
            title: title.into(),
            page,
        }
    }
}

/// A chapter of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Sequential number starting at 1
    pub number: u32,
    /// Chapter title
    pub title: String,
    /// First page (inclusive)
    pub start_page: u32,
    /// Last page (inclusive)
    pub end_page: u32,
    /// Page of the last section owned by this chapter
    pub last_content_page: Option<u32>,
}

impl Chapter {
    /// Title of the chapter synthesized when no usable outline exists.
    pub const DEFAULT_TITLE: &'static str = "Main Content";

    /// Create a chapter.
    pub fn new(number: u32, title: impl Into<String>, start_page: u32, end_page: u32) -> Self {
        Self {
            number,
            title: title.into(),
            start_page,
            end_page,
            last_content_page: None,
        }
    }

    /// Single chapter covering the whole document.
    pub fn default_for(total_pages: u32) -> Self {
        Self::new(1, Self::DEFAULT_TITLE, 1, total_pages.max(1))
    }

    /// Whether the page lies within the chapter.
    pub fn contains(&self, page: u32) -> bool {
        page >= self.start_page && page <= self.end_page
    }
}

/// A second-level outline unit inside a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Sequential number within the chapter, starting at 1
    pub number: u32,
    /// Owning chapter number
    pub chapter_number: u32,
    /// Lesson title
    pub title: String,
    /// First page (inclusive)
    pub start_page: u32,
    /// Last page (inclusive)
    pub end_page: u32,
}
