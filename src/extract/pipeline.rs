//! Extraction run orchestration.

use std::time::Instant;

use rayon::prelude::*;

use crate::error::{Error, Result, Stage};
use crate::model::{
    content_hash, ContentBlock, ExtractionMetadata, ExtractionResult, PageLayout, Question,
    Section, SectionType,
};
use crate::parser::PageSource;

use super::analyzer;
use super::classifier::Classifier;
use super::dedup::Deduplicator;
use super::options::{ErrorMode, ExtractOptions};
use super::questions::QuestionDetector;
use super::structure::DocumentStructure;

/// Runs the analyzer, classifier, structure builder and question detector
/// over every page of a source.
///
/// A pipeline holds only configuration and compiled patterns; all state of
/// a run lives in the run itself, so one pipeline can extract many
/// documents, concurrently if needed.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: ExtractOptions,
    classifier: Classifier,
    detector: QuestionDetector,
}

impl Pipeline {
    /// Create a pipeline with the given options.
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            classifier: Classifier::new(),
            detector: QuestionDetector::new(),
        }
    }

    /// The options this pipeline runs with.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// The block classifier.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// The question detector.
    pub fn detector(&self) -> &QuestionDetector {
        &self.detector
    }

    /// Analyze and classify the non-empty blocks of a page.
    pub fn classify_page(&self, page: &PageLayout) -> Vec<ContentBlock> {
        page.blocks
            .iter()
            .filter_map(|block| {
                let text = block.text();
                if text.is_empty() {
                    return None;
                }

                let metadata = analyzer::analyze(block, page.width, page.height);
                let classification = self.classifier.classify_block(&text, &metadata);

                Some(ContentBlock {
                    text,
                    bbox: block.bbox,
                    page_number: page.number,
                    block_type: classification.block_type,
                    confidence: classification.confidence,
                    metadata,
                })
            })
            .collect()
    }

    /// Extract a document with a fresh deduplicator.
    pub fn extract<S: PageSource + ?Sized>(&self, source: &S) -> Result<ExtractionResult> {
        let mut dedup = Deduplicator::new();
        self.extract_with(source, &mut dedup)
    }

    /// Extract a document using the given deduplicator.
    ///
    /// The deduplicator is not reset, so texts seen in earlier runs are
    /// treated as duplicates.
    pub fn extract_with<S: PageSource + ?Sized>(
        &self,
        source: &S,
        dedup: &mut Deduplicator,
    ) -> Result<ExtractionResult> {
        self.options.validate()?;

        let started = Instant::now();
        let name = source.name().to_string();
        let total_pages = source.page_count();

        if total_pages > self.options.max_pages {
            return Err(Error::PageLimitExceeded {
                pages: total_pages,
                limit: self.options.max_pages,
            });
        }
        if total_pages == 0 {
            return Err(Error::PdfParse("document has no pages".to_string())
                .in_stage(&name, Stage::Open));
        }

        let mut run = Run::new(total_pages);

        let toc = match source.outline() {
            Ok(toc) => toc,
            Err(e) => match self.options.error_mode {
                ErrorMode::Strict => return Err(e.in_stage(&name, Stage::Outline)),
                ErrorMode::Lenient => {
                    run.warn(format!("Outline could not be read: {}", e));
                    Vec::new()
                }
            },
        };

        let structure = DocumentStructure::build(&toc, total_pages);
        for warning in structure.warnings() {
            run.warn(warning.clone());
        }

        if self.options.parallel {
            let pages: Vec<(u32, Result<Vec<ContentBlock>>)> = (1..=total_pages)
                .into_par_iter()
                .map(|number| (number, self.read_page(source, number)))
                .collect();
            for (number, page) in pages {
                self.record_page(&mut run, &structure, dedup, &name, number, page)?;
            }
        } else {
            for number in 1..=total_pages {
                let page = self.read_page(source, number);
                self.record_page(&mut run, &structure, dedup, &name, number, page)?;
            }
        }

        let metadata = ExtractionMetadata {
            source: name,
            title: source.title(),
            author: source.author(),
            pdf_version: source.version(),
            extracted_at: Some(chrono::Utc::now()),
            processing_time_ms: started.elapsed().as_millis() as u64,
            outline_entries: toc.len(),
            default_chapter: structure.is_default(),
            duplicates_skipped: run.duplicates_skipped,
        };
        let result = run.finish(structure, metadata);

        log::info!(
            "Extracted {}: {} pages, {} chapters, {} sections, {} questions in {} ms",
            result.metadata.source,
            result.total_pages,
            result.chapters.len(),
            result.sections.len(),
            result.questions.len(),
            result.metadata.processing_time_ms
        );

        Ok(result)
    }

    fn read_page<S: PageSource + ?Sized>(
        &self,
        source: &S,
        number: u32,
    ) -> Result<Vec<ContentBlock>> {
        let mut page = source.page(number)?;
        page.number = number;
        Ok(self.classify_page(&page))
    }

    fn record_page(
        &self,
        run: &mut Run,
        structure: &DocumentStructure,
        dedup: &mut Deduplicator,
        name: &str,
        number: u32,
        page: Result<Vec<ContentBlock>>,
    ) -> Result<()> {
        let blocks = match page {
            Ok(blocks) => blocks,
            Err(e) => match self.options.error_mode {
                ErrorMode::Strict => return Err(e.in_stage(name, Stage::Page(number))),
                ErrorMode::Lenient => {
                    run.warn(format!("Page {} skipped: {}", number, e));
                    return Ok(());
                }
            },
        };

        if blocks.is_empty() {
            run.warn(format!("Page {} has no extractable text", number));
            return Ok(());
        }

        let first_section = run.sections.len();
        let first_question = run.questions.len();
        let owner = structure.resolve(number);
        let mut order_in_page = 0;

        for block in blocks {
            if self.options.deduplicate && dedup.is_duplicate(&block.text) {
                run.duplicates_skipped += 1;
                continue;
            }

            let section = Section {
                id: run.sections.len(),
                section_type: block.block_type.section_type(),
                title: self.classifier.section_title(&block.text),
                page_number: number,
                content_hash: content_hash(&block.text),
                position_on_page: block.bbox.into(),
                chapter: Some(owner.chapter),
                lesson: owner.lesson,
                order_in_page,
                confidence: block.confidence,
                metadata: block.metadata,
                content: block.text,
            };
            order_in_page += 1;

            if block.block_type.yields_questions() {
                run.questions.extend(self.detector.detect(&section));
            }
            run.sections.push(section);
        }

        if self.options.link_questions {
            // First exercise on the page, even when several share it
            let exercise = run.sections[first_section..]
                .iter()
                .find(|s| s.section_type == SectionType::Exercise)
                .map(|s| s.id);
            for question in &mut run.questions[first_question..] {
                question.section = exercise;
            }
        }

        log::debug!(
            "Page {}: {} sections, {} questions",
            number,
            run.sections.len() - first_section,
            run.questions.len() - first_question
        );
        Ok(())
    }
}

/// Mutable state of one extraction run.
struct Run {
    total_pages: u32,
    sections: Vec<Section>,
    questions: Vec<Question>,
    errors: Vec<String>,
    duplicates_skipped: usize,
}

impl Run {
    fn new(total_pages: u32) -> Self {
        Self {
            total_pages,
            sections: Vec::new(),
            questions: Vec::new(),
            errors: Vec::new(),
            duplicates_skipped: 0,
        }
    }

    fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.errors.push(message);
    }

    fn finish(self, structure: DocumentStructure, metadata: ExtractionMetadata) -> ExtractionResult {
        let (mut chapters, lessons, _) = structure.into_parts();

        for section in &self.sections {
            let Some(number) = section.chapter else {
                continue;
            };
            if let Some(chapter) = chapters.iter_mut().find(|c| c.number == number) {
                chapter.last_content_page = Some(
                    chapter
                        .last_content_page
                        .map_or(section.page_number, |p| p.max(section.page_number)),
                );
            }
        }

        ExtractionResult {
            total_pages: self.total_pages,
            chapters,
            lessons,
            sections: self.sections,
            questions: self.questions,
            errors: self.errors,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, PositionedBlock, TextLine, TextSpan, TocEntry};
    use crate::model::{BlockType, QuestionType};

    struct Pages(Vec<Vec<&'static str>>);

    impl PageSource for Pages {
        fn name(&self) -> &str {
            "pages"
        }

        fn page_count(&self) -> u32 {
            self.0.len() as u32
        }

        fn page(&self, number: u32) -> Result<PageLayout> {
            let mut page = PageLayout::letter(number);
            for (i, text) in self.0[number as usize - 1].iter().enumerate() {
                let y = 200.0 + i as f32 * 100.0;
                page.add_block(PositionedBlock::new(
                    BoundingBox::new(72.0, y, 540.0, y + 60.0),
                    text.lines()
                        .map(|l| TextLine::new(vec![TextSpan::new(l, 11.0, "Times-Roman")]))
                        .collect(),
                ));
            }
            Ok(page)
        }

        fn outline(&self) -> Result<Vec<TocEntry>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_classify_page_skips_empty_blocks() {
        let pipeline = Pipeline::default();
        let mut page = PageLayout::letter(2);
        page.add_block(PositionedBlock::new(BoundingBox::default(), Vec::new()));
        page.add_block(PositionedBlock::new(
            BoundingBox::new(72.0, 300.0, 540.0, 340.0),
            vec![TextLine::new(vec![TextSpan::new("Exercise 1", 12.0, "Times-Bold")])],
        ));

        let blocks = pipeline.classify_page(&page);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block_type, BlockType::Section(SectionType::Exercise));
        assert_eq!(blocks[0].page_number, 2);
        assert!((blocks[0].confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_questions_link_to_first_exercise_on_page() {
        let source = Pages(vec![vec![
            "Exercise 1\n1. What is rain?",
            "Exercise 2\n1. What is snow?",
        ]]);
        let result = Pipeline::default().extract(&source).unwrap();

        assert_eq!(result.questions.len(), 2);
        // Both questions point at the first exercise, even the one from the second
        assert!(result.questions.iter().all(|q| q.section == Some(0)));
        assert_eq!(result.questions[1].source_section, 1);
    }

    #[test]
    fn test_linking_can_be_disabled() {
        let source = Pages(vec![vec!["Exercise 1\n1. What is rain?"]]);
        let pipeline = Pipeline::new(ExtractOptions::new().with_link_questions(false));
        let result = pipeline.extract(&source).unwrap();
        assert_eq!(result.questions[0].section, None);
    }

    #[test]
    fn test_order_in_page_and_last_content_page() {
        let source = Pages(vec![
            vec!["Plants need light.", "Roots take up water."],
            vec![],
            vec!["Leaves make food."],
        ]);
        let result = Pipeline::default().extract(&source).unwrap();

        let orders: Vec<_> = result.sections_on_page(1).map(|s| s.order_in_page).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(result.chapters[0].last_content_page, Some(3));
        assert!(result.errors.iter().any(|e| e.contains("Page 2")));
    }

    #[test]
    fn test_in_text_question() {
        let source = Pages(vec![vec!["Why do birds sing?"]]);
        let result = Pipeline::default().extract(&source).unwrap();
        assert_eq!(result.sections[0].section_type, SectionType::InText);
        assert_eq!(result.questions.len(), 1);
        assert_eq!(result.questions[0].question_type, QuestionType::ShortAnswer);
        assert_eq!(result.questions[0].section, None);
    }

    #[test]
    fn test_shared_deduplicator_spans_runs() {
        let source = Pages(vec![vec!["Plants need light."]]);
        let pipeline = Pipeline::default();
        let mut dedup = Deduplicator::new();

        let first = pipeline.extract_with(&source, &mut dedup).unwrap();
        let second = pipeline.extract_with(&source, &mut dedup).unwrap();
        assert_eq!(first.sections.len(), 1);
        assert!(second.sections.is_empty());
        assert_eq!(second.metadata.duplicates_skipped, 1);
    }
}
