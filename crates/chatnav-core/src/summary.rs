#![forbid(unsafe_code)]

//! Short labels for navigation entries.
//!
//! [`summarize`] is pure and host-independent. It tries, in order:
//!
//! 1. the leading question: the first run of text ending in `?` that contains
//!    no earlier `.`, `!` or `?`;
//! 2. the first sentence (split on `.`, `!`, `?`, newline);
//! 3. the whole normalized text.
//!
//! Heuristic candidates must be longer than [`MIN_HEURISTIC_LEN`] characters
//! once trimmed. The chosen candidate is cut to `max_len` characters with a
//! literal `...` appended when it is longer.
//!
//! Lengths count Unicode scalar values.

/// Default label length used by the panel.
pub const DEFAULT_SUMMARY_LEN: usize = 80;

/// A heuristic candidate must be strictly longer than this to be used.
pub const MIN_HEURISTIC_LEN: usize = 10;

const ELLIPSIS: &str = "...";
const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', '\n'];
const NON_QUESTION_TERMINATORS: &[char] = &['.', '!'];

/// Summarize raw message text into a navigation label.
#[must_use]
pub fn summarize(text: &str, max_len: usize) -> String {
    let normalized = normalize(text);

    if let Some(question) = leading_question(&normalized) {
        let question = question.trim();
        if question.chars().count() > MIN_HEURISTIC_LEN {
            return truncate(question, max_len);
        }
    }

    let first_sentence = normalized
        .split(SENTENCE_TERMINATORS)
        .next()
        .unwrap_or_default()
        .trim();
    if first_sentence.chars().count() > MIN_HEURISTIC_LEN {
        return truncate(first_sentence, max_len);
    }

    truncate(&normalized, max_len)
}

/// Trim and collapse every whitespace run to a single space.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Leftmost run of non-terminators ending in `?`, including the `?`.
fn leading_question(text: &str) -> Option<&str> {
    let mark = text.find('?')?;
    let start = text[..mark]
        .rfind(NON_QUESTION_TERMINATORS)
        .map_or(0, |idx| idx + 1);
    Some(&text[start..=mark])
}

/// Cut to `max_len` characters plus `...` when longer, else unchanged.
#[must_use]
pub fn truncate(candidate: &str, max_len: usize) -> String {
    match candidate.char_indices().nth(max_len) {
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + ELLIPSIS.len());
            out.push_str(&candidate[..cut]);
            out.push_str(ELLIPSIS);
            out
        }
        None => candidate.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_question_is_returned_whole() {
        assert_eq!(
            summarize("short question?", DEFAULT_SUMMARY_LEN),
            "short question?"
        );
    }

    #[test]
    fn long_question_is_cut_to_eighty_plus_ellipsis() {
        let question = format!("{}?", "w".repeat(89));
        assert_eq!(question.chars().count(), 90);

        let summary = summarize(&question, DEFAULT_SUMMARY_LEN);
        assert_eq!(summary.chars().count(), 83);
        assert!(summary.ends_with("..."));
        assert_eq!(&summary[..80], &question[..80]);
    }

    #[test]
    fn question_beats_earlier_sentence() {
        let text = "I rebuilt the whole project yesterday. Why does the linker fail on CI? Thanks.";
        assert_eq!(
            summarize(text, DEFAULT_SUMMARY_LEN),
            "Why does the linker fail on CI?"
        );
    }

    #[test]
    fn tiny_question_falls_back_to_first_sentence() {
        let text = "Please review this change carefully. Ok?";
        assert_eq!(
            summarize(text, DEFAULT_SUMMARY_LEN),
            "Please review this change carefully"
        );
    }

    #[test]
    fn tiny_question_and_sentence_fall_back_to_text() {
        let text = "Hi? Here is the rest";
        assert_eq!(summarize(text, DEFAULT_SUMMARY_LEN), "Hi? Here is the rest");
    }

    #[test]
    fn whitespace_is_collapsed_before_matching() {
        let text = "  How   do\n\nI\tcollapse   whitespace?  ";
        assert_eq!(
            summarize(text, DEFAULT_SUMMARY_LEN),
            "How do I collapse whitespace?"
        );
    }

    #[test]
    fn first_sentence_is_truncated_too() {
        let text = format!("{}. Second.", "a".repeat(100));
        let summary = summarize(&text, DEFAULT_SUMMARY_LEN);
        assert_eq!(summary, format!("{}...", "a".repeat(80)));
    }

    #[test]
    fn empty_text_stays_empty() {
        assert_eq!(summarize("", DEFAULT_SUMMARY_LEN), "");
        assert_eq!(summarize(" \n\t ", DEFAULT_SUMMARY_LEN), "");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "ü".repeat(12);
        assert_eq!(truncate(&text, 10), format!("{}...", "ü".repeat(10)));
        assert_eq!(truncate(&text, 12), text);
    }

    #[test]
    fn exclamation_bounds_the_question_run() {
        let text = "Wow that worked! Could you also explain the borrow checker?";
        assert_eq!(
            summarize(text, DEFAULT_SUMMARY_LEN),
            "Could you also explain the borrow checker?"
        );
    }
}
