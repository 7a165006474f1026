//! Scan configuration — thresholds, budgets, and resource caps
//!
//! Every limit that shapes a run lives here so the pipeline code never
//! carries magic numbers. The defaults are tuned for the GitHub code-search
//! rate limiter and for the O(n·m) edit-distance tables downstream.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Similarity above which a TF-IDF cosine score counts as a hit.
pub const TFIDF_SIMILARITY_THRESHOLD: f64 = 0.70;

/// Similarity above which a fuzzy-substring score counts as a hit.
pub const LEVEN_SIMILARITY_THRESHOLD: f64 = 0.70;

/// Similarity above which the product of the two scores counts as a hit.
pub const COMBINED_SIMILARITY_THRESHOLD: f64 = 0.40;

/// How many candidate files the discovery phase samples for searching.
pub const NO_OF_FILES_FOR_PARSING: usize = 18;

/// Search results requested per code-search query.
pub const NUMBER_OF_FILES_TO_QUERY: usize = 10;

/// Global cap on search hits examined across the whole discovery phase.
pub const NO_OF_MAX_SEARCHED_FILES_TO_PARSE: usize = 180;

/// Every text is cut to this many bytes before any DP table is built.
pub const TEXT_MAX_LENGTH: usize = 25_000;

/// How many discovered repositories the deep evaluation phase takes on.
pub const CHOOSE_TOP_N_REPOS: usize = 8;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// TF-IDF cosine threshold for evidence collection
    pub tfidf_similarity_threshold: f64,
    /// Fuzzy-substring threshold for evidence collection
    pub leven_similarity_threshold: f64,
    /// Combined (product) threshold for evidence collection
    pub combined_similarity_threshold: f64,
    /// Discovery sample size
    pub files_for_parsing: usize,
    /// Search results per query
    pub files_to_query: usize,
    /// Global discovery hit budget
    pub max_searched_files: usize,
    /// Per-text byte cap applied before normalization and DP
    pub text_max_length: usize,
    /// Repositories carried into deep evaluation
    pub top_n_repos: usize,
    /// Concurrent fetch-and-compare workers per search batch
    pub hit_concurrency: usize,
    /// Sleep between rate-limited search attempts
    pub rate_limit_backoff: Duration,
    /// Attempts before a rate-limited search is given up
    pub rate_limit_max_retries: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tfidf_similarity_threshold: TFIDF_SIMILARITY_THRESHOLD,
            leven_similarity_threshold: LEVEN_SIMILARITY_THRESHOLD,
            combined_similarity_threshold: COMBINED_SIMILARITY_THRESHOLD,
            files_for_parsing: NO_OF_FILES_FOR_PARSING,
            files_to_query: NUMBER_OF_FILES_TO_QUERY,
            max_searched_files: NO_OF_MAX_SEARCHED_FILES_TO_PARSE,
            text_max_length: TEXT_MAX_LENGTH,
            top_n_repos: CHOOSE_TOP_N_REPOS,
            hit_concurrency: 3,
            rate_limit_backoff: Duration::from_secs(10),
            rate_limit_max_retries: 100,
        }
    }
}
