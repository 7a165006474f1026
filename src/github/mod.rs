//! GitHub integration — code search, raw-content fetch, and cloning.

pub mod clone;
pub mod search;

pub use clone::{is_valid_github_url, repo_id_from_url, ClonedRepo, RepoCloner};
pub use search::SearchClient;

use serde::Deserialize;

/// One code-search result.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub name: String,
    pub path: String,
    pub repository: RepoRef,
}

/// The repository a hit belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoRef {
    pub full_name: String,
}

/// Body of a `/search/code` response.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<SearchHit>,
}
