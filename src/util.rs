//! Shared helpers.

use serde_json::Value;

/// Find the first JSON object embedded in free-form model output.
///
/// Every `{` is tried in turn, so placeholder text such as `{topic}` ahead of
/// the real object does not hide it. Braces inside JSON string literals do not
/// end a candidate early.
pub fn extract_json_object(text: &str) -> Option<Value> {
    text.match_indices('{').find_map(|(start, _)| {
        let candidate = balanced_object_at(&text[start..])?;
        serde_json::from_str::<Value>(candidate)
            .ok()
            .filter(Value::is_object)
    })
}

/// The balanced `{ ... }` prefix of `text`, which must start with `{`.
fn balanced_object_at(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_object() {
        assert_eq!(extract_json_object(r#"{"overall": 7}"#), Some(json!({"overall": 7})));
    }

    #[test]
    fn object_wrapped_in_prose_and_fences() {
        let text = "Scores below:\n```json\n{\"clarity\": 8, \"seo\": 6}\n```\nThanks!";
        assert_eq!(extract_json_object(text), Some(json!({"clarity": 8, "seo": 6})));
    }

    #[test]
    fn nested_objects() {
        let text = r#"{"scores": {"overall": 9}, "comments": "ok"} trailing"#;
        assert_eq!(
            extract_json_object(text),
            Some(json!({"scores": {"overall": 9}, "comments": "ok"}))
        );
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let text = r#"{"comments": "close with } and open with {", "overall": 5}"#;
        assert_eq!(
            extract_json_object(text),
            Some(json!({"comments": "close with } and open with {", "overall": 5}))
        );
    }

    #[test]
    fn escaped_quotes_inside_strings() {
        let text = r#"{"comments": "say \"hi\" }"}"#;
        assert_eq!(extract_json_object(text), Some(json!({"comments": "say \"hi\" }"})));
    }

    #[test]
    fn placeholder_braces_before_the_object_are_skipped() {
        let text = "Evaluation for {topic}:\n{\"overall\": 8}";
        assert_eq!(extract_json_object(text), Some(json!({"overall": 8})));
    }

    #[test]
    fn no_object() {
        assert_eq!(extract_json_object("Error: No final response from agent."), None);
        assert_eq!(extract_json_object("only {placeholders} here"), None);
    }

    #[test]
    fn unclosed_object() {
        assert_eq!(extract_json_object(r#"{"overall": 7"#), None);
    }
}
