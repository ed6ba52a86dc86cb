//! Answer quality heuristic.
//!
//! Detects canned "I need more information" replies so the dispatcher can
//! retry with the fallback prompt. The phrase list is deliberately blunt;
//! keep it behind this single predicate so it can be swapped out without
//! touching dispatch logic.

use regex::Regex;
use std::sync::LazyLock;

/// Refusal phrases, matched case-insensitively anywhere in the answer.
static REFUSAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)i am ready",
        r"(?i)please provide",
        r"(?i)ready to assist",
        r"(?i)summarize",
        r"(?i)provide the case document",
        r"(?i)assist you",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("refusal pattern compiles"))
    .collect()
});

/// True when the answer is empty or looks like a canned refusal.
pub fn is_low_quality_answer(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    REFUSAL_PATTERNS.iter().any(|re| re.is_match(trimmed))
}
