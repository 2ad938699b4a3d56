//! Context compaction between pipeline stages.
//!
//! Compaction is a deterministic head/tail character-budget truncation. Text
//! within budget passes through untouched; longer text keeps its first 70% of
//! the budget and its last 20%, joined by a visible marker:
//!
//! ```text
//! <head: floor(0.7 * max_chars) chars>
//!
//! ...[content truncated for brevity]...
//!
//! <tail: floor(0.2 * max_chars) chars>
//! ```
//!
//! The result may exceed `max_chars` by the marker length.
//!
//! Lengths are counted in Unicode scalar values, not bytes.

/// Marker inserted between the retained head and tail.
pub const TRUNCATION_MARKER: &str = "\n\n...[content truncated for brevity]...\n\n";

/// Separator placed between messages by [`compact_history`].
pub const HISTORY_SEPARATOR: &str = "\n\n---\n\n";

/// Budget used when a caller has no stage-specific limit.
pub const DEFAULT_MAX_CHARS: usize = 8000;

const HEAD_RATIO: f64 = 0.7;
const TAIL_RATIO: f64 = 0.2;

/// Truncate `text` to a head/tail sample when it exceeds `max_chars`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    let len = text.chars().count();
    if len <= max_chars {
        return text.to_string();
    }

    let head_chars = (max_chars as f64 * HEAD_RATIO) as usize;
    let tail_chars = (max_chars as f64 * TAIL_RATIO) as usize;

    let head: String = text.chars().take(head_chars).collect();
    let tail: String = text.chars().skip(len - tail_chars).collect();

    let mut out = String::with_capacity(head.len() + TRUNCATION_MARKER.len() + tail.len());
    out.push_str(&head);
    out.push_str(TRUNCATION_MARKER);
    out.push_str(&tail);
    out
}

/// Join `messages` in order with [`HISTORY_SEPARATOR`] and truncate the result.
pub fn compact_history<S: AsRef<str>>(messages: &[S], max_chars: usize) -> String {
    let combined = messages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(HISTORY_SEPARATOR);
    truncate(&combined, max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_within_budget_is_unchanged() {
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("hello", 100), "hello");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn long_text_keeps_head_marker_and_tail() {
        let text: String = (0..200).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let out = truncate(&text, 100);

        assert!(out.starts_with(&text[..70]));
        assert!(out.ends_with(&text[text.len() - 20..]));
        assert!(out.contains(TRUNCATION_MARKER));
        assert_eq!(out.chars().count(), 70 + TRUNCATION_MARKER.chars().count() + 20);
    }

    #[test]
    fn output_may_exceed_budget_by_marker() {
        let text = "x".repeat(6001);
        let out = truncate(&text, 6000);
        assert_eq!(out.len(), 4200 + TRUNCATION_MARKER.len() + 1200);
        assert!(out.len() > 6000);
    }

    #[test]
    fn fractional_budgets_round_down() {
        // 0.7 * 15 = 10.5 -> 10, 0.2 * 15 = 3.0 -> 3
        let text = "abcdefghijklmnopqrstuvwxyz";
        let out = truncate(text, 15);
        assert_eq!(out, format!("abcdefghij{}xyz", TRUNCATION_MARKER));
    }

    #[test]
    fn tiny_budget_keeps_no_tail() {
        // 0.2 * 4 rounds down to zero tail characters.
        let out = truncate("abcdefgh", 4);
        assert_eq!(out, format!("ab{}", TRUNCATION_MARKER));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "é".repeat(20);
        let out = truncate(&text, 10);
        assert!(out.starts_with(&"é".repeat(7)));
        assert!(out.ends_with(&"é".repeat(2)));
    }

    #[test]
    fn compact_history_of_nothing_is_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(compact_history(&empty, 100), "");
    }

    #[test]
    fn compact_history_joins_in_order() {
        assert_eq!(compact_history(&["a", "b"], 100), "a\n\n---\n\nb");
        assert_eq!(
            compact_history(&["first".to_string(), "second".to_string(), "third".to_string()], 1000),
            "first\n\n---\n\nsecond\n\n---\n\nthird"
        );
    }

    #[test]
    fn compact_history_truncates_the_joined_text() {
        let messages = vec!["a".repeat(50), "b".repeat(50)];
        let out = compact_history(&messages, 40);
        assert!(out.starts_with(&"a".repeat(28)));
        assert!(out.ends_with(&"b".repeat(8)));
        assert!(out.contains(TRUNCATION_MARKER));
    }
}
