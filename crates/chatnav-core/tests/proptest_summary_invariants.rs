//! Property-based invariant tests for the summary extractor.
//!
//! Verifies:
//! 1. Output never exceeds `max_len` characters plus the three-dot ellipsis.
//! 2. Output has no leading whitespace and no whitespace runs.
//! 3. Terminator-free text that fits is returned normalized and unchanged.
//! 4. A long enough question after a period-terminated sentence wins.
//! 5. Determinism: same input, same output.

use chatnav_core::summary::{DEFAULT_SUMMARY_LEN, normalize, summarize};
use proptest::prelude::*;

fn arb_words() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-zA-Z]{1,12}", 1..30).prop_map(|w| w.join(" "))
}

proptest! {
    #[test]
    fn length_is_bounded(text in ".{0,400}", max_len in 1usize..120) {
        let summary = summarize(&text, max_len);
        prop_assert!(summary.chars().count() <= max_len + 3);
    }

    #[test]
    fn output_is_normalized(text in "[ a-z.!?\t\n]{0,200}") {
        let summary = summarize(&text, DEFAULT_SUMMARY_LEN);
        prop_assert!(!summary.starts_with(' '));
        prop_assert!(!summary.contains("  "));
        prop_assert!(!summary.contains('\n'));
    }

    #[test]
    fn plain_text_that_fits_is_unchanged(words in arb_words()) {
        let normalized = normalize(&words);
        prop_assume!(normalized.chars().count() <= DEFAULT_SUMMARY_LEN);
        prop_assert_eq!(summarize(&words, DEFAULT_SUMMARY_LEN), normalized);
    }

    #[test]
    fn question_beats_first_sentence(
        sentence in arb_words(),
        question in "[a-z]{11,40}",
    ) {
        let text = format!("{sentence}. {question}?");
        let summary = summarize(&text, DEFAULT_SUMMARY_LEN);
        prop_assert_eq!(summary, format!("{question}?"));
    }

    #[test]
    fn deterministic(text in ".{0,200}") {
        prop_assert_eq!(
            summarize(&text, DEFAULT_SUMMARY_LEN),
            summarize(&text, DEFAULT_SUMMARY_LEN)
        );
    }
}
