//! TF-IDF corpus model, cosine similarity, and keyword extraction
//!
//! An append-only document-frequency corpus: `add_docs` extends the corpus,
//! `vector` weighs a text against it. IDF is derived lazily from the current
//! counts, so interleaved adds and queries always see consistent state —
//! callers sharing one instance across tasks serialize every call behind an
//! exclusive lock, since `vector` reads the same `df`/`docs_added` state
//! that `add_docs` mutates.

pub mod tokenize;

pub use tokenize::{tokenize_non_letter_chars, tokenize_words};

use std::collections::{HashMap, HashSet};

/// Token-producing function plugged into a model at construction.
pub type Tokenizer = fn(&str) -> Vec<String>;

/// Sparse TF-IDF weights for one document.
pub type WeightMap = HashMap<String, f64>;

/// Append-only TF-IDF corpus at a fixed token granularity.
pub struct TfIdfModel {
    docs_added: usize,
    df: HashMap<String, usize>,
    tokenizer: Tokenizer,
}

impl TfIdfModel {
    /// Corpus with word-level tokens (keyword extraction).
    pub fn new() -> Self {
        Self::with_tokenizer(tokenize_words)
    }

    /// Corpus with a caller-chosen tokenizer.
    pub fn with_tokenizer(tokenizer: Tokenizer) -> Self {
        Self {
            docs_added: 0,
            df: HashMap::new(),
            tokenizer,
        }
    }

    pub fn docs_added(&self) -> usize {
        self.docs_added
    }

    /// Extend the corpus: each document contributes +1 to the document
    /// frequency of every DISTINCT token it contains.
    pub fn add_docs<S: AsRef<str>>(&mut self, texts: &[S]) {
        for text in texts {
            let distinct: HashSet<String> =
                (self.tokenizer)(text.as_ref()).into_iter().collect();
            for token in distinct {
                *self.df.entry(token).or_insert(0) += 1;
            }
        }
        self.docs_added += texts.len();
    }

    /// Weigh `text` against the corpus: normalized term frequency ×
    /// `ln(docs_added / df)`. Terms absent from the corpus contribute
    /// nothing.
    pub fn vector(&self, text: &str) -> WeightMap {
        if self.docs_added == 0 {
            return WeightMap::new();
        }

        let tokens = (self.tokenizer)(text);
        let total = tokens.len() as f64;
        if total == 0.0 {
            return WeightMap::new();
        }

        let mut counts: HashMap<String, usize> = HashMap::new();
        for token in tokens {
            *counts.entry(token).or_insert(0) += 1;
        }

        let mut weights = WeightMap::with_capacity(counts.len());
        for (token, count) in counts {
            let Some(&df) = self.df.get(&token) else {
                continue;
            };
            let tf = count as f64 / total;
            let idf = (self.docs_added as f64 / df as f64).ln();
            let weight = tf * idf;
            if weight > 0.0 {
                weights.insert(token, weight);
            }
        }
        weights
    }
}

impl Default for TfIdfModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Cosine similarity between two sparse vectors, in [0, 1]. Zero when
/// either vector is zero.
pub fn cosine(a: &WeightMap, b: &WeightMap) -> f64 {
    // iterate the smaller map
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut dot = 0.0;
    for (token, &w) in small {
        if let Some(&v) = large.get(token) {
            dot += w * v;
        }
    }

    let norm_a: f64 = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Extract the `n` strongest keywords from a weight map.
///
/// Tie-break discipline, in order: weight descending; the leading run of
/// tokens tied at the top weight re-sorted by token length descending; the
/// result truncated to `min(10, n)`. Fully deterministic for identical
/// inputs.
pub fn top_n_keywords(n: usize, weights: &WeightMap) -> Vec<String> {
    let mut pairs: Vec<(&str, f64)> = weights.iter().map(|(t, &w)| (t.as_str(), w)).collect();
    if pairs.is_empty() || n == 0 {
        return Vec::new();
    }

    // Deterministic base order: weight desc, token asc among equal weights
    pairs.sort_by(|x, y| {
        y.1.partial_cmp(&x.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| x.0.cmp(y.0))
    });

    // Re-rank the run tied at the top weight by token length, longest first
    let top = pairs[0].1;
    let tied = pairs.iter().take_while(|p| p.1 == top).count();
    pairs[..tied].sort_by(|x, y| y.0.len().cmp(&x.0.len()).then_with(|| x.0.cmp(y.0)));

    pairs.truncate(n.min(10));
    pairs.into_iter().map(|(t, _)| t.to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> TfIdfModel {
        let mut model = TfIdfModel::new();
        model.add_docs(texts);
        model
    }

    #[test]
    fn df_counts_distinct_tokens_once_per_doc() {
        let model = corpus(&["apple apple banana", "banana cherry"]);
        assert_eq!(model.docs_added(), 2);
        assert_eq!(model.df.get("apple"), Some(&1));
        assert_eq!(model.df.get("banana"), Some(&2));
        assert_eq!(model.df.get("cherry"), Some(&1));
    }

    #[test]
    fn rare_terms_outweigh_common_ones() {
        let model = corpus(&["shared rare", "shared other", "shared third"]);
        let v = model.vector("shared rare");
        // "shared" is in every doc: idf = ln(1) = 0, so it drops out
        assert!(!v.contains_key("shared"));
        assert!(v["rare"] > 0.0);
    }

    #[test]
    fn unseen_terms_contribute_nothing() {
        let model = corpus(&["alpha beta", "beta gamma"]);
        let v = model.vector("alpha neverseen");
        assert!(v.contains_key("alpha"));
        assert!(!v.contains_key("neverseen"));
    }

    #[test]
    fn vectorization_is_stable_under_repetition() {
        let model = corpus(&["fn main", "struct Foo", "impl Bar"]);
        let v1 = model.vector("fn main struct");
        let v2 = model.vector("fn main struct");
        assert!((cosine(&v1, &v2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn add_docs_is_commutative_wrt_idf() {
        let forward = corpus(&["a b c", "b c d", "c d e"]);
        let backward = corpus(&["c d e", "b c d", "a b c"]);
        let text = "a b c d e";
        let vf = forward.vector(text);
        let vb = backward.vector(text);
        assert_eq!(vf.len(), vb.len());
        for (token, w) in &vf {
            assert!((w - vb[token]).abs() < 1e-12, "token {token}");
        }
    }

    #[test]
    fn cosine_of_vector_with_itself_is_one() {
        let model = corpus(&["one two three", "four five six"]);
        let v = model.vector("one two");
        assert!(!v.is_empty());
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_with_zero_vector_is_zero() {
        let model = corpus(&["one two", "three four"]);
        let v = model.vector("one");
        let zero = WeightMap::new();
        assert_eq!(cosine(&v, &zero), 0.0);
        assert_eq!(cosine(&zero, &zero), 0.0);
    }

    #[test]
    fn cosine_of_disjoint_vectors_is_zero() {
        let model = corpus(&["one two", "three four", "five six"]);
        let a = model.vector("one two");
        let b = model.vector("three four");
        assert_eq!(cosine(&a, &b), 0.0);
    }

    #[test]
    fn empty_corpus_vectorizes_to_nothing() {
        let model = TfIdfModel::new();
        assert!(model.vector("anything at all").is_empty());
    }

    #[test]
    fn keywords_tie_broken_by_length_desc() {
        let weights: WeightMap = [("a", 1.0), ("bb", 1.0), ("ccc", 1.0)]
            .into_iter()
            .map(|(t, w)| (t.to_owned(), w))
            .collect();
        assert_eq!(top_n_keywords(2, &weights), vec!["ccc", "bb"]);
    }

    #[test]
    fn keywords_ordered_by_weight_when_distinct() {
        let weights: WeightMap = [("low", 0.1), ("high", 0.9), ("mid", 0.5)]
            .into_iter()
            .map(|(t, w)| (t.to_owned(), w))
            .collect();
        assert_eq!(top_n_keywords(3, &weights), vec!["high", "mid", "low"]);
    }

    #[test]
    fn keywords_deterministic_across_calls() {
        let weights: WeightMap = [("xx", 0.5), ("yy", 0.5), ("zz", 0.5), ("w", 0.4)]
            .into_iter()
            .map(|(t, w)| (t.to_owned(), w))
            .collect();
        let first = top_n_keywords(3, &weights);
        for _ in 0..10 {
            assert_eq!(top_n_keywords(3, &weights), first);
        }
    }

    #[test]
    fn keywords_capped_at_ten() {
        let weights: WeightMap = (0..25)
            .map(|i| (format!("token{i:02}"), 1.0 + i as f64))
            .collect();
        assert_eq!(top_n_keywords(99, &weights).len(), 10);
    }

    #[test]
    fn keywords_of_empty_weights() {
        assert!(top_n_keywords(4, &WeightMap::new()).is_empty());
    }
}
