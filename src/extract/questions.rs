//! Question expansion, typing and option extraction.

use regex::Regex;

use crate::model::{Question, QuestionType, Section, SectionType};

/// Word count below which a question is short-answer.
pub const SHORT_ANSWER_WORDS: usize = 50;

/// Splits exercise and in-text sections into typed questions.
#[derive(Debug, Clone)]
pub struct QuestionDetector {
    numbered: Regex,
    option_line: Regex,
    option_marker: Regex,
    choose: Regex,
    true_word: Regex,
    false_word: Regex,
    interrogative: Regex,
}

impl QuestionDetector {
    pub fn new() -> Self {
        Self {
            numbered: compile(r"^\d+\s*[.)]"),
            option_line: compile(r"(?i)^[a-d]\)\s*(.+)"),
            option_marker: compile(r"[a-d]\)"),
            choose: compile(r"(?i)\bchoose\b"),
            true_word: compile(r"(?i)\btrue\b"),
            false_word: compile(r"(?i)\bfalse\b"),
            interrogative: compile(r"(?i)\b(what|how|why|when|where|which|who)\b"),
        }
    }

    /// Detect the kind of a question from its text.
    pub fn question_type(&self, text: &str) -> QuestionType {
        if self.option_marker.is_match(text) || self.choose.is_match(text) {
            return QuestionType::MultipleChoice;
        }
        if self.true_word.is_match(text) && self.false_word.is_match(text) {
            return QuestionType::TrueFalse;
        }
        if text.split_whitespace().count() < SHORT_ANSWER_WORDS {
            return QuestionType::ShortAnswer;
        }
        QuestionType::LongAnswer
    }

    /// Lettered option lines, in order; `None` when there are none.
    pub fn options(&self, text: &str) -> Option<Vec<String>> {
        let options: Vec<String> = text
            .lines()
            .filter_map(|line| self.option_line.captures(line.trim()))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
            .collect();

        if options.is_empty() {
            None
        } else {
            Some(options)
        }
    }

    fn is_option_line(&self, line: &str) -> bool {
        self.option_line.is_match(line)
    }

    /// Split section text into question texts.
    ///
    /// Numbered lines start questions. Without any, non-option lines with a
    /// question mark or an interrogative word do. Lines before the first
    /// starter are a heading and are dropped. When no line starts a
    /// question, `whole_block` decides between one question made of the
    /// entire text and none.
    pub fn split(&self, text: &str, whole_block: bool) -> Vec<String> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let numbered: Vec<bool> = lines.iter().map(|l| self.numbered.is_match(l)).collect();
        let starts = if numbered.iter().any(|n| *n) {
            numbered
        } else {
            lines
                .iter()
                .map(|l| {
                    !self.is_option_line(l) && (l.contains('?') || self.interrogative.is_match(l))
                })
                .collect()
        };

        let mut questions: Vec<Vec<&str>> = Vec::new();
        for (line, starts_question) in lines.iter().copied().zip(starts) {
            if starts_question {
                questions.push(vec![line]);
            } else if let Some(current) = questions.last_mut() {
                current.push(line);
            }
        }

        if questions.is_empty() {
            let text = text.trim();
            if whole_block && !text.is_empty() {
                return vec![text.to_string()];
            }
            return Vec::new();
        }

        questions.into_iter().map(|q| q.join("\n")).collect()
    }

    /// Expand a recorded section into questions.
    ///
    /// Exercise sections yield one question per starter line; in-text
    /// sections fall back to a single question made of their whole text.
    pub fn detect(&self, section: &Section) -> Vec<Question> {
        let whole_block = section.section_type != SectionType::Exercise;

        self.split(&section.content, whole_block)
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let question_type = self.question_type(&text);
                let options = match question_type {
                    QuestionType::MultipleChoice => self.options(&text),
                    _ => None,
                };
                Question {
                    question_type,
                    options,
                    page_number: section.page_number,
                    section: None,
                    source_section: section.id,
                    order_in_section: i as u32,
                    confidence: section.confidence,
                    text,
                }
            })
            .collect()
    }
}

impl Default for QuestionDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}
