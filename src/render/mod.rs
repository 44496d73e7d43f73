//! Rendering module for extraction results.

mod json;
mod summary;

pub use json::{from_json, to_json, JsonFormat};
pub use summary::to_summary;
