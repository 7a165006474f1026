//! Code-search and raw-content client with rate-limit backoff
//!
//! The search API is the pipeline's bottleneck: anonymous callers get a
//! handful of requests per minute. A 403 is therefore not an error but a
//! wait signal — sleep and retry, up to the configured cap, before
//! surfacing a network failure.

use super::{SearchHit, SearchResponse};
use crate::config::ScanConfig;
use crate::{CopytraceError, CopytraceResult};
use std::time::Duration;

const API_BASE: &str = "https://api.github.com";
const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Thin client over the GitHub code-search and contents endpoints.
#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    token: Option<String>,
    backoff: Duration,
    max_retries: u32,
}

impl SearchClient {
    /// Build a client, picking up `GITHUB_TOKEN` from the environment when
    /// present; anonymous otherwise.
    pub fn from_env(config: &ScanConfig) -> CopytraceResult<Self> {
        let token = std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|t| !t.is_empty());
        if token.is_none() {
            tracing::warn!(
                "{} not set; searching anonymously at a much lower rate limit",
                TOKEN_ENV_VAR
            );
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("copytrace/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CopytraceError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            token,
            backoff: config.rate_limit_backoff,
            max_retries: config.rate_limit_max_retries,
        })
    }

    /// Search code for `query`, returning up to `per_page` hits.
    ///
    /// `query` is passed through verbatim: `+` separators are part of the
    /// search syntax and must not be percent-encoded.
    pub async fn search_code(
        &self,
        query: &str,
        per_page: usize,
    ) -> CopytraceResult<Vec<SearchHit>> {
        let url = format!("{API_BASE}/search/code?q={query}&per_page={per_page}");

        for attempt in 1..=self.max_retries {
            let mut request = self
                .http
                .get(&url)
                .header("Accept", "application/vnd.github.v3+json");
            if let Some(token) = &self.token {
                request = request.header("Authorization", format!("token {token}"));
            }

            let response = request
                .send()
                .await
                .map_err(|e| CopytraceError::Network(format!("search request failed: {e}")))?;

            let status = response.status();
            if status == reqwest::StatusCode::FORBIDDEN {
                tracing::warn!(
                    "search rate limit hit (attempt {attempt}/{}); retrying in {:?}",
                    self.max_retries,
                    self.backoff
                );
                tokio::time::sleep(self.backoff).await;
                continue;
            }
            if !status.is_success() {
                return Err(CopytraceError::Network(format!(
                    "search returned HTTP {status} for {url}"
                )));
            }

            let body: SearchResponse = response
                .json()
                .await
                .map_err(|e| CopytraceError::Network(format!("bad search response: {e}")))?;
            tracing::debug!(
                "search '{}': {} total, {} returned",
                query,
                body.total_count,
                body.items.len()
            );
            return Ok(body.items);
        }

        Err(CopytraceError::Network(format!(
            "rate limit retries exhausted after {} attempts for {url}",
            self.max_retries
        )))
    }

    /// Fetch the raw body of a search hit via the contents endpoint.
    pub async fn fetch_raw(&self, hit: &SearchHit) -> CopytraceResult<String> {
        let url = format!(
            "{API_BASE}/repos/{}/contents/{}",
            hit.repository.full_name, hit.path
        );

        let mut request = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github.v3.raw");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| CopytraceError::Network(format!("raw fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CopytraceError::Network(format!(
                "raw fetch returned HTTP {status} for {url}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| CopytraceError::Network(format!("failed to read raw body: {e}")))
    }
}
