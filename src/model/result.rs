//! The aggregate output of one extraction run.

use super::{Chapter, Lesson, Question, QuestionType, Section, SectionType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trace information about a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Label of the source document (usually its path)
    pub source: String,
    /// Document title from the PDF info dictionary
    pub title: Option<String>,
    /// Document author from the PDF info dictionary
    pub author: Option<String>,
    /// PDF version (e.g., "1.7")
    pub pdf_version: Option<String>,
    /// When the run finished
    pub extracted_at: Option<DateTime<Utc>>,
    /// Wall-clock duration of the run in milliseconds
    pub processing_time_ms: u64,
    /// Number of outline entries read
    pub outline_entries: usize,
    /// Whether the synthetic "Main Content" chapter was used
    pub default_chapter: bool,
    /// Number of blocks dropped as exact duplicates
    pub duplicates_skipped: usize,
}

/// Chapters, sections and questions recovered from one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Total number of pages in the document
    pub total_pages: u32,
    /// Chapters in outline order
    pub chapters: Vec<Chapter>,
    /// Second-level outline units
    pub lessons: Vec<Lesson>,
    /// Recorded sections in page order
    pub sections: Vec<Section>,
    /// Questions in page order
    pub questions: Vec<Question>,
    /// Non-fatal warnings
    pub errors: Vec<String>,
    /// Run trace
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    /// Create an empty result for a document.
    pub fn new(total_pages: u32) -> Self {
        Self {
            total_pages,
            ..Default::default()
        }
    }

    /// Look up a chapter by number.
    pub fn chapter(&self, number: u32) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.number == number)
    }

    /// Look up a section by id.
    pub fn section(&self, id: usize) -> Option<&Section> {
        self.sections.get(id)
    }

    /// Sections of one type.
    pub fn sections_of_type(&self, section_type: SectionType) -> impl Iterator<Item = &Section> {
        self.sections
            .iter()
            .filter(move |s| s.section_type == section_type)
    }

    /// Sections on one page.
    pub fn sections_on_page(&self, page: u32) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| s.page_number == page)
    }

    /// Questions expanded from one section.
    pub fn questions_from(&self, section_id: usize) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .filter(move |q| q.source_section == section_id)
    }

    /// Number of sections per type, in [`SectionType::ALL`] order.
    pub fn section_counts(&self) -> Vec<(SectionType, usize)> {
        SectionType::ALL
            .iter()
            .map(|t| (*t, self.sections_of_type(*t).count()))
            .collect()
    }

    /// Number of questions per type, in [`QuestionType::ALL`] order.
    pub fn question_counts(&self) -> Vec<(QuestionType, usize)> {
        QuestionType::ALL
            .iter()
            .map(|t| (*t, self.questions.iter().filter(|q| q.question_type == *t).count()))
            .collect()
    }

    /// Whether the run produced any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockMetadata, PositionOnPage};

    fn section(id: usize, page: u32, section_type: SectionType) -> Section {
        Section {
            id,
            section_type,
            title: String::new(),
            page_number: page,
            content: format!("section {}", id),
            content_hash: String::new(),
            position_on_page: PositionOnPage::default(),
            chapter: Some(1),
            lesson: None,
            order_in_page: 0,
            confidence: 0.5,
            metadata: BlockMetadata::default(),
        }
    }

    #[test]
    fn test_section_counts() {
        let mut result = ExtractionResult::new(3);
        result.sections.push(section(0, 1, SectionType::ReadingMaterial));
        result.sections.push(section(1, 2, SectionType::Exercise));
        result.sections.push(section(2, 2, SectionType::Exercise));

        let counts = result.section_counts();
        assert_eq!(counts[0], (SectionType::ReadingMaterial, 1));
        assert_eq!(counts[1], (SectionType::Exercise, 2));
        assert_eq!(result.sections_on_page(2).count(), 2);
        assert_eq!(result.section(1).map(|s| s.page_number), Some(2));
    }

    #[test]
    fn test_empty_result() {
        let result = ExtractionResult::new(0);
        assert!(!result.has_warnings());
        assert!(result.chapter(1).is_none());
        assert!(result.question_counts().iter().all(|(_, n)| *n == 0));
    }
}
