//! Question records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    LongAnswer,
}

impl QuestionType {
    /// All question types in a stable order.
    pub const ALL: [QuestionType; 4] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::ShortAnswer,
        QuestionType::LongAnswer,
    ];

    /// Short storage code.
    pub fn code(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "MCQ",
            QuestionType::TrueFalse => "TF",
            QuestionType::ShortAnswer => "SA",
            QuestionType::LongAnswer => "LA",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QuestionType::MultipleChoice => "multiple choice",
            QuestionType::TrueFalse => "true/false",
            QuestionType::ShortAnswer => "short answer",
            QuestionType::LongAnswer => "long answer",
        };
        f.write_str(label)
    }
}

/// A question found in an exercise or in-text section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Question stem
    pub text: String,
    /// Detected kind
    pub question_type: QuestionType,
    /// Answer options; only present for multiple choice with at least one option line
    pub options: Option<Vec<String>>,
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Linked section id (first exercise section on the same page)
    pub section: Option<usize>,
    /// Section id the question was expanded from
    pub source_section: usize,
    /// Order among the questions of the source section
    pub order_in_section: u32,
    /// Confidence inherited from the source section
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_codes() {
        let codes: Vec<_> = QuestionType::ALL.iter().map(|t| t.code()).collect();
        assert_eq!(codes, vec!["MCQ", "TF", "SA", "LA"]);
    }

    #[test]
    fn test_absent_options_serialize_as_null() {
        let q = Question {
            text: "Choose the best answer.".to_string(),
            question_type: QuestionType::MultipleChoice,
            options: None,
            page_number: 2,
            section: None,
            source_section: 0,
            order_in_section: 0,
            confidence: 0.8,
        };
        let json = serde_json::to_value(&q).unwrap();
        assert!(json["options"].is_null());
        assert_eq!(json["question_type"], "multiple_choice");
    }
}
