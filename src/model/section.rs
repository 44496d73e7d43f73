//! Recorded content sections.

use super::{BlockMetadata, BoundingBox, SectionType};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Placement of a section on its page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionOnPage {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<BoundingBox> for PositionOnPage {
    fn from(bbox: BoundingBox) -> Self {
        Self {
            x: bbox.x0,
            y: bbox.y0,
            width: bbox.width(),
            height: bbox.height(),
        }
    }
}

/// A typed content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Index of the section within the result
    pub id: usize,
    /// Content type
    pub section_type: SectionType,
    /// Title taken from the first line (may be empty)
    pub title: String,
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Raw text content
    pub content: String,
    /// SHA-256 of `content`
    pub content_hash: String,
    /// Placement on the page
    pub position_on_page: PositionOnPage,
    /// Owning chapter number
    pub chapter: Option<u32>,
    /// Owning lesson number within the chapter
    pub lesson: Option<u32>,
    /// Order among the sections recorded on the same page
    pub order_in_page: u32,
    /// Classification confidence
    pub confidence: f32,
    /// Font and position signals of the source block
    pub metadata: BlockMetadata,
}

/// Hex-encoded SHA-256 of the exact text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
