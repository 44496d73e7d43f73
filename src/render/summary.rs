//! Plain-text summary report for extraction results.

use crate::model::ExtractionResult;

/// Render a human-readable summary of an extraction result.
///
/// Lists chapters with their page spans and lessons, counts per section
/// and question type, and every warning.
pub fn to_summary(result: &ExtractionResult) -> String {
    let mut out = String::new();
    let meta = &result.metadata;

    out.push_str(&format!("Document: {}\n", meta.source));
    if let Some(title) = &meta.title {
        out.push_str(&format!("Title: {}\n", title));
    }
    if let Some(author) = &meta.author {
        out.push_str(&format!("Author: {}\n", author));
    }
    out.push_str(&format!("Pages: {}\n", result.total_pages));

    out.push('\n');
    out.push_str(&format!("Chapters: {}\n", result.chapters.len()));
    for chapter in &result.chapters {
        out.push_str(&format!(
            "  {}. {} (pages {}-{})\n",
            chapter.number, chapter.title, chapter.start_page, chapter.end_page
        ));
        for lesson in result
            .lessons
            .iter()
            .filter(|l| l.chapter_number == chapter.number)
        {
            out.push_str(&format!(
                "     {}.{} {} (pages {}-{})\n",
                chapter.number, lesson.number, lesson.title, lesson.start_page, lesson.end_page
            ));
        }
    }

    out.push('\n');
    out.push_str(&format!("Sections: {}\n", result.sections.len()));
    for (section_type, count) in result.section_counts() {
        if count > 0 {
            out.push_str(&format!("  {:<18} {}\n", section_type.label(), count));
        }
    }

    out.push('\n');
    out.push_str(&format!("Questions: {}\n", result.questions.len()));
    for (question_type, count) in result.question_counts() {
        if count > 0 {
            out.push_str(&format!("  {:<18} {}\n", question_type.to_string(), count));
        }
    }

    if meta.duplicates_skipped > 0 {
        out.push('\n');
        out.push_str(&format!("Duplicates skipped: {}\n", meta.duplicates_skipped));
    }

    if result.has_warnings() {
        out.push('\n');
        out.push_str(&format!("Warnings: {}\n", result.errors.len()));
        for warning in &result.errors {
            out.push_str(&format!("  - {}\n", warning));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chapter, Lesson};

    #[test]
    fn test_summary_lists_structure() {
        let mut result = ExtractionResult::new(12);
        result.metadata.source = "reader.pdf".to_string();
        result.chapters.push(Chapter::new(1, "Plants", 1, 8));
        result.chapters.push(Chapter::new(2, "Animals", 9, 12));
        result.lessons.push(Lesson {
            number: 1,
            chapter_number: 1,
            title: "Roots".to_string(),
            start_page: 4,
            end_page: 8,
        });
        result.errors.push("Page 3 has no extractable text".to_string());

        let summary = to_summary(&result);
        assert!(summary.contains("Document: reader.pdf"));
        assert!(summary.contains("Pages: 12"));
        assert!(summary.contains("1. Plants (pages 1-8)"));
        assert!(summary.contains("1.1 Roots (pages 4-8)"));
        assert!(summary.contains("2. Animals (pages 9-12)"));
        assert!(summary.contains("Warnings: 1"));
        assert!(!summary.contains("Duplicates"));
    }
}
