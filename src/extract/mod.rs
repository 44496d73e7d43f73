//! Textbook structure extraction.
//!
//! Per page, positioned blocks flow through the [`analyzer`] and the
//! [`Classifier`], get their chapter and lesson from the
//! [`DocumentStructure`], pass the [`Deduplicator`], and exercise or
//! in-text sections are expanded by the [`QuestionDetector`]. The
//! [`Pipeline`] ties these together into one [`ExtractionResult`].
//!
//! [`ExtractionResult`]: crate::model::ExtractionResult

pub mod analyzer;
mod classifier;
mod dedup;
mod options;
mod pipeline;
mod questions;
mod structure;

pub use classifier::{confidence, Classification, Classifier, MAX_TITLE_LEN};
pub use dedup::Deduplicator;
pub use options::{ErrorMode, ExtractOptions, DEFAULT_MAX_PAGES};
pub use pipeline::Pipeline;
pub use questions::{QuestionDetector, SHORT_ANSWER_WORDS};
pub use structure::{DocumentStructure, Ownership};
