//! Page sources: reading positioned text and outlines from documents.

mod layout;
mod pdf_source;
mod source;

pub use layout::PageFrame;
pub use pdf_source::{check_header, PdfSource};
pub use source::PageSource;
