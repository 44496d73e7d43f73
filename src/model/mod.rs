//! Document model types for extraction output.
//!
//! This module defines the positioned-text input read from pages, the
//! transient classified blocks, and the chapter/section/question records
//! that make up an [`ExtractionResult`].

mod block;
mod layout;
mod outline;
mod question;
mod result;
mod section;

pub use block::{BlockMetadata, BlockType, ContentBlock, FontInfo, PositionInfo, SectionType};
pub use layout::{BoundingBox, PageLayout, PositionedBlock, TextLine, TextSpan};
pub use outline::{Chapter, Lesson, TocEntry};
pub use question::{Question, QuestionType};
pub use result::{ExtractionMetadata, ExtractionResult};
pub use section::{content_hash, PositionOnPage, Section};
