//! Bidirectional best-substring comparison
//!
//! Fuzzy substring search is asymmetric: which text plays the needle
//! matters. The comparison therefore runs both directions and reports the
//! higher percentage. Each run locates a region of its HAYSTACK, so the
//! run with B as haystack yields B's span and vice versa; every span is
//! mapped back to ORIGINAL offsets through its own text's normalizer.

use super::fuzzy::find_substring;
use super::normalize::NormalizedText;
use serde::{Deserialize, Serialize};

/// Half-open byte range in an ORIGINAL (pre-normalization) text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Outcome of comparing two normalized texts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// The higher of the two directional percentages
    pub percentage: f64,
    /// Matched region of text A, in A's original offsets
    pub span_a: Span,
    /// Matched region of text B, in B's original offsets
    pub span_b: Span,
}

/// Compare two normalized texts, taking the best score across both
/// needle/haystack assignments.
pub fn compute_similarity(a: &NormalizedText, b: &NormalizedText) -> SimilarityResult {
    let forward = find_substring(&a.normalized, &b.normalized);
    let backward = find_substring(&b.normalized, &a.normalized);

    let percentage = forward.percentage.max(backward.percentage);

    // forward's offsets index B's normalized buffer, backward's index A's.
    // An end offset at the very edge of the buffer can map one past the
    // original when it lacked a trailing newline; clamp so spans always
    // slice cleanly.
    let span_a = Span {
        start: a.original_index_for(backward.start).min(a.original_len),
        end: a.original_index_for(backward.end).min(a.original_len),
    };
    let span_b = Span {
        start: b.original_index_for(forward.start).min(b.original_len),
        end: b.original_index_for(forward.end).min(b.original_len),
    };

    SimilarityResult {
        percentage,
        span_a,
        span_b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_score_one() {
        let a = NormalizedText::parse("fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n");
        let b = NormalizedText::parse("fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n");
        let r = compute_similarity(&a, &b);
        assert!((r.percentage - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn indentation_changes_do_not_lower_the_score() {
        let a = NormalizedText::parse("if ready {\nstart();\n}\n");
        let b = NormalizedText::parse("    if ready {\n        start();\n    }\n");
        let r = compute_similarity(&a, &b);
        assert!((r.percentage - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reports_the_better_direction() {
        // b embeds all of a plus noise: a-as-needle matches perfectly,
        // b-as-needle cannot
        let a = NormalizedText::parse("shared body\n");
        let b = NormalizedText::parse("prefix junk\nshared body\nsuffix junk\n");
        let r = compute_similarity(&a, &b);
        assert!((r.percentage - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn spans_point_into_the_original_texts() {
        let original_b = "  shared body  \nonly in b\n";
        let a = NormalizedText::parse("shared body\nonly in a\n");
        let b = NormalizedText::parse(original_b);
        let r = compute_similarity(&a, &b);
        // span_b brackets the shared region inside b's ORIGINAL text
        assert!(r.span_b.start >= 2);
        assert!(r.span_b.end <= original_b.len());
        assert!(!r.span_b.is_empty());
        let excerpt = &original_b[r.span_b.start..r.span_b.end];
        assert!(excerpt.contains("shared body"));
    }

    #[test]
    fn unrelated_texts_score_low() {
        let a = NormalizedText::parse("alpha beta gamma delta\n");
        let b = NormalizedText::parse("9876543210 zyxw\n");
        let r = compute_similarity(&a, &b);
        assert!(r.percentage < 0.5);
    }
}
