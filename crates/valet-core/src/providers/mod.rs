//! Multi-provider AI abstraction layer
//!
//! Adapters for Google Gemini, OpenAI, and a deterministic local mock, all
//! implementing the [`AiProvider`] trait and composed by [`AiRouter`] for
//! priority-ordered failover. The mock is the terminal fallback: always
//! available, never fails, so the router always has somewhere to land.

pub mod gemini;
pub mod mock;
pub mod openai;
pub mod router;
pub mod types;

pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use openai::OpenAiProvider;
pub use router::{AiRouter, ProviderEntry, ProviderStat};
pub use types::AiProvider;

/// Slice out the first top-level JSON object in a block of model output.
/// Models asked for JSON-only replies still wrap it in prose or fences
/// often enough that this is needed.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Same as [`extract_json_object`] but for a top-level JSON array
pub(crate) fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

/// Char-safe prefix, used to keep transcripts inside provider input limits
pub(crate) fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object() {
        let text = "Here is the result:\n```json\n{\"a\": 1}\n```\nHope that helps!";
        assert_eq!(extract_json_object(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_extract_json_object_none_when_absent() {
        assert_eq!(extract_json_object("no braces here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_extract_json_array() {
        let text = "Action items: [\"one\", \"two\"] as requested";
        assert_eq!(extract_json_array(text), Some("[\"one\", \"two\"]"));
        assert_eq!(extract_json_array("nothing"), None);
    }

    #[test]
    fn test_extract_spans_nested_structures() {
        let text = "{\"outer\": {\"inner\": [1, 2]}}";
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
