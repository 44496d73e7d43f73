//! Classified content blocks and their type vocabulary.

use super::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a recorded section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    /// Body text
    ReadingMaterial,
    /// Exercise, activity or practice set
    Exercise,
    /// "Points to ponder" style reflection prompt
    PointToPonder,
    /// Note addressed to the teacher
    TeacherNote,
    /// Warm-up before a reading
    PreReading,
    /// Follow-up after a reading
    PostReading,
    /// Question embedded in the running text
    InText,
}

impl SectionType {
    /// All section types in a stable order.
    pub const ALL: [SectionType; 7] = [
        SectionType::ReadingMaterial,
        SectionType::Exercise,
        SectionType::PointToPonder,
        SectionType::TeacherNote,
        SectionType::PreReading,
        SectionType::PostReading,
        SectionType::InText,
    ];

    /// Short storage code.
    pub fn code(&self) -> &'static str {
        match self {
            SectionType::ReadingMaterial => "RM",
            SectionType::Exercise => "EX",
            SectionType::PointToPonder => "PP",
            SectionType::TeacherNote => "TN",
            SectionType::PreReading => "PRE",
            SectionType::PostReading => "POST",
            SectionType::InText => "IT",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SectionType::ReadingMaterial => "reading material",
            SectionType::Exercise => "exercise",
            SectionType::PointToPonder => "point to ponder",
            SectionType::TeacherNote => "teacher note",
            SectionType::PreReading => "pre-reading",
            SectionType::PostReading => "post-reading",
            SectionType::InText => "in-text",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification assigned to a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// A section of the given type
    Section(SectionType),
    /// Chapter/unit/lesson heading
    Chapter,
    /// Free-standing question
    Question,
}

impl BlockType {
    /// Section type the block is recorded under.
    ///
    /// Chapter headings are part of the reading flow; questions found
    /// outside exercises are in-text prompts.
    pub fn section_type(&self) -> SectionType {
        match self {
            BlockType::Section(t) => *t,
            BlockType::Chapter => SectionType::ReadingMaterial,
            BlockType::Question => SectionType::InText,
        }
    }

    /// Whether blocks of this type are expanded into questions.
    pub fn yields_questions(&self) -> bool {
        matches!(
            self,
            BlockType::Section(SectionType::Exercise) | BlockType::Question
        )
    }
}

impl Default for BlockType {
    fn default() -> Self {
        BlockType::Section(SectionType::ReadingMaterial)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockType::Section(t) => write!(f, "{}", t),
            BlockType::Chapter => f.write_str("chapter"),
            BlockType::Question => f.write_str("question"),
        }
    }
}

/// Formatting signals of a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontInfo {
    /// Largest span size in points
    pub font_size: f32,
    /// Font family of the last span
    pub font_name: String,
    /// Any span bold
    pub is_bold: bool,
    /// Any span italic
    pub is_italic: bool,
}

/// Page-relative geometry of a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionInfo {
    pub relative_x: f32,
    pub relative_y: f32,
    pub width_ratio: f32,
    pub height_ratio: f32,
    pub is_header: bool,
    pub is_footer: bool,
    pub is_sidebar: bool,
}

/// Font and position signals carried along with a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockMetadata {
    pub font_info: FontInfo,
    pub position_info: PositionInfo,
}

/// A classified text region of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Block text
    pub text: String,
    /// Bounding box in page coordinates
    pub bbox: BoundingBox,
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Assigned type
    pub block_type: BlockType,
    /// Advisory classification certainty in [0, 1]
    pub confidence: f32,
    /// Formatting and geometry signals
    pub metadata: BlockMetadata,
}
