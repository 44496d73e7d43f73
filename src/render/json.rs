//! JSON rendering for extraction results.

use crate::error::{Error, Result};
use crate::model::ExtractionResult;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an extraction result to JSON.
pub fn to_json(result: &ExtractionResult, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(result),
        JsonFormat::Compact => serde_json::to_string(result),
    };

    json.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Parse an extraction result back from JSON.
pub fn from_json(json: &str) -> Result<ExtractionResult> {
    serde_json::from_str(json).map_err(|e| Error::Render(format!("JSON parse error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Chapter;

    fn sample() -> ExtractionResult {
        let mut result = ExtractionResult::new(10);
        result.chapters.push(Chapter::default_for(10));
        result.metadata.title = Some("Science Reader".to_string());
        result
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"total_pages\": 10"));
        assert!(json.contains("Main Content"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_from_json() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        let parsed = from_json(&json).unwrap();
        assert_eq!(parsed.chapters, sample().chapters);
        assert!(matches!(from_json("{"), Err(Error::Render(_))));
    }
}
