//! # copytrace — Source-Plagiarism Ranking Engine
//!
//! Given a *candidate* repository (local directory or GitHub URL), copytrace
//! discovers external repositories that plausibly served as its source and
//! ranks them by weighted textual similarity.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     copytrace pipeline                     │
//! │                                                            │
//! │  candidate files ──► TF-IDF corpus (word + char models)    │
//! │        │                                                   │
//! │  ┌─────▼──────────┐   keyword query    ┌────────────────┐  │
//! │  │ Discovery (P1) ├───────────────────►│ GitHub search  │  │
//! │  │ sample 18 files│◄───────────────────┤ + raw fetch    │  │
//! │  └─────┬──────────┘   hits (sem ≤ 3)   └────────────────┘  │
//! │        │  normalize → fuzzy substring → cosine → evidence  │
//! │  ┌─────▼──────────┐                                        │
//! │  │ Evaluation (P2)│  top-N repos → clone → pairwise match  │
//! │  └─────┬──────────┘  → lines-copied weighted scores        │
//! │        ▼                                                   │
//! │   colored ranking table                                    │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core machinery
//!
//! - **Normalizer** ([`text::NormalizedText`]): whitespace-stripped view of a
//!   file with a bidirectional index map, so fuzzy matches on the stripped
//!   text are reportable as spans in the original source.
//! - **Fuzzy substring** ([`text::find_substring`]): Levenshtein DP with a
//!   zeroed base row, turning edit distance into approximate substring
//!   search with a rightmost-argmin end position.
//! - **TF-IDF** ([`tfidf::TfIdfModel`]): append-only document-frequency
//!   corpus at word or non-letter-character granularity, used both for
//!   search-keyword extraction and cosine similarity.
//! - **Two-phase pipeline** ([`pipeline`]): cheap search-driven discovery
//!   accumulates per-repository evidence; expensive deep evaluation clones
//!   the strongest candidates and scores them file-by-file.

pub mod config;
pub mod github;
pub mod pipeline;
pub mod repo;
pub mod report;
pub mod text;
pub mod tfidf;

// Re-exports for convenience
pub use config::ScanConfig;
pub use pipeline::{FileEvidence, RepoScore};
pub use text::{NormalizedText, SimilarityResult, SubstringMatch};
pub use tfidf::TfIdfModel;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopytraceError {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("clone failed: {0}")]
    Clone(String),

    #[error("index {0} precedes the first line")]
    NotFoundInLines(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type CopytraceResult<T> = Result<T, CopytraceError>;
