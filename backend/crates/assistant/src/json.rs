//! Lenient JSON extraction from model output.
//!
//! Models wrap JSON in prose or Markdown fences. The first JSON value that
//! parses wins; anything after it is ignored.

use serde_json::{Deserializer, Value};

pub(crate) fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    trimmed
        .char_indices()
        .filter(|(_, c)| *c == '{' || *c == '[')
        .find_map(|(start, _)| {
            Deserializer::from_str(&trimmed[start..])
                .into_iter::<Value>()
                .next()
                .and_then(Result::ok)
        })
}

/// Strip surrounding quotes and code fences from a plain-text completion.
pub(crate) fn clean_text(text: &str) -> String {
    let mut s = text.trim();
    if let Some(inner) = s.strip_prefix("```") {
        // Drop an optional language tag on the opening fence
        let inner = inner.split_once('\n').map_or(inner, |(_, rest)| rest);
        s = inner.strip_suffix("```").unwrap_or(inner).trim();
    }
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s = &s[1..s.len() - 1];
    }
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_plain_json() {
        assert_eq!(extract_json(r#"{"rating": 4}"#), Some(json!({"rating": 4})));
        assert_eq!(extract_json(" [1, 2] "), Some(json!([1, 2])));
    }

    #[test]
    fn test_json_inside_prose_and_fences() {
        let text = "Sure! Here you go:\n```json\n{\"rating\": 5, \"confidence\": 0.9}\n```\nAnything else?";
        assert_eq!(
            extract_json(text),
            Some(json!({"rating": 5, "confidence": 0.9}))
        );

        let text = "Suggestions: [\"jazz night\", \"food fair\"] hope that helps";
        assert_eq!(extract_json(text), Some(json!(["jazz night", "food fair"])));
    }

    #[test]
    fn test_skips_unbalanced_candidates() {
        let text = "rating {not json} then {\"rating\": 2}";
        assert_eq!(extract_json(text), Some(json!({"rating": 2})));
    }

    #[test]
    fn test_no_json() {
        assert_eq!(extract_json("I cannot help with that."), None);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  \"A lovely evening\"  "), "A lovely evening");
        assert_eq!(clean_text("```\nA lovely evening\n```"), "A lovely evening");
        assert_eq!(clean_text("```text\nأمسية جميلة\n```"), "أمسية جميلة");
    }
}
