//! Pattern and geometry based block classification.

use regex::Regex;

use crate::model::{BlockMetadata, BlockType, FontInfo, PositionInfo, SectionType};

/// Longest title kept for a section.
pub const MAX_TITLE_LEN: usize = 255;

/// Ordered pattern table. The first matching rule decides the type.
const RULES: &[(BlockType, &[&str])] = &[
    (
        BlockType::Section(SectionType::Exercise),
        &[
            r"^Exercise\s+\d+\.?\d*",
            r"^Activity\s+\d+\.?\d*",
            r"^Practice\s+\d+\.?\d*",
            r"^\d+\.\s*[A-Z]",
        ],
    ),
    (
        BlockType::Section(SectionType::PointToPonder),
        &[
            r"^Points?\s+to\s+Ponder",
            r"^Think\s+About",
            r"^Reflect\s+on",
            r"^Consider\s+this",
        ],
    ),
    (
        BlockType::Section(SectionType::TeacherNote),
        &[
            r"^Teacher'?s?\s+Note",
            r"^Instructor\s+Note",
            r"^Teaching\s+Tip",
            r"^\[Teacher\]",
            r"^\(Teacher\)",
        ],
    ),
    (
        BlockType::Section(SectionType::PreReading),
        &[r"^Pre-?Reading", r"^Before\s+Reading", r"^Warm-?up"],
    ),
    (
        BlockType::Section(SectionType::PostReading),
        &[r"^Post-?Reading", r"^After\s+Reading", r"^Follow-?up"],
    ),
    (
        BlockType::Chapter,
        &[r"^Chapter\s+\d+", r"^Unit\s+\d+", r"^Lesson\s+\d+"],
    ),
];

/// Signals that a block asks something.
const QUESTION_INDICATORS: &[&str] = &[
    r"\?",
    r"^\d+\.",
    r"^[a-z]\)",
    r"\b(what|how|why|when|where|which|who)\b",
];

const HEADING_KEYWORDS: &str = r"\b(chapter|unit|lesson)s?\b";

const TITLE_PREFIX: &str = r"^(Exercise|Activity|Practice)\s+\d+\.?\d*\s*[:\-]?\s*";

/// Outcome of classifying one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Assigned type
    pub block_type: BlockType,
    /// Advisory certainty in [0, 1]
    pub confidence: f32,
    /// Whether a rule from the pattern table matched
    pub pattern_matched: bool,
}

/// Assigns a [`BlockType`] and confidence to block text.
///
/// Classification is a pure function of the text and its signals; the
/// classifier holds only compiled patterns and can be shared across threads.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<(BlockType, Vec<Regex>)>,
    question_indicators: Vec<Regex>,
    heading_keywords: Regex,
    title_prefix: Regex,
}

impl Classifier {
    /// Create a classifier with the built-in rule table.
    pub fn new() -> Self {
        let rules = RULES
            .iter()
            .map(|(block_type, patterns)| (*block_type, compile_all(patterns)))
            .collect();

        Self {
            rules,
            question_indicators: compile_all(QUESTION_INDICATORS),
            heading_keywords: compile(HEADING_KEYWORDS),
            title_prefix: compile(TITLE_PREFIX),
        }
    }

    /// First rule of the pattern table matching the text.
    pub fn match_pattern(&self, text: &str) -> Option<BlockType> {
        self.rules
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| p.is_match(text)))
            .map(|(block_type, _)| *block_type)
    }

    /// Whether the text carries any question indicator.
    pub fn has_question_indicator(&self, text: &str) -> bool {
        self.question_indicators.iter().any(|p| p.is_match(text))
    }

    /// Classify block text using its position and font signals.
    pub fn classify(&self, text: &str, position: &PositionInfo, font: &FontInfo) -> Classification {
        let matched = self.match_pattern(text);
        let block_type = matched.unwrap_or_else(|| self.classify_by_layout(text, position));

        Classification {
            block_type,
            confidence: confidence(matched.is_some(), font),
            pattern_matched: matched.is_some(),
        }
    }

    /// Classify a block from its analyzed metadata.
    pub fn classify_block(&self, text: &str, metadata: &BlockMetadata) -> Classification {
        self.classify(text, &metadata.position_info, &metadata.font_info)
    }

    fn classify_by_layout(&self, text: &str, position: &PositionInfo) -> BlockType {
        if position.is_header {
            if self.heading_keywords.is_match(text) {
                return BlockType::Chapter;
            }
            return BlockType::Section(SectionType::ReadingMaterial);
        }

        if position.is_sidebar {
            return BlockType::Section(SectionType::TeacherNote);
        }

        if self.has_question_indicator(text) {
            return BlockType::Question;
        }

        BlockType::Section(SectionType::ReadingMaterial)
    }

    /// Section title: the first line without its exercise numbering prefix.
    pub fn section_title(&self, text: &str) -> String {
        let first_line = text.lines().next().unwrap_or("").trim();
        let title = self.title_prefix.replace(first_line, "");
        title.trim().chars().take(MAX_TITLE_LEN).collect()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Advisory confidence score.
pub fn confidence(pattern_matched: bool, font: &FontInfo) -> f32 {
    let mut confidence = 0.5;
    if pattern_matched {
        confidence += 0.3;
    }
    if font.is_bold {
        confidence += 0.1;
    }
    if font.font_size > 14.0 {
        confidence += 0.1;
    }
    f32::clamp(confidence, 0.0, 1.0)
}

fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).expect("built-in pattern must compile")
}

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| compile(p)).collect()
}
