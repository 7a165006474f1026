//! Pipeline data model — per-file evidence, per-repo scores, and the
//! aggregation rules shared by both phases.

pub mod discovery;
pub mod evaluation;
pub mod progress;

pub use discovery::{run_discovery, DiscoveryOutcome};
pub use evaluation::{preliminary_scores, run_deep_evaluation};
pub use progress::{NoopReporter, ProgressReporter, TerminalReporter};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One candidate-file/challengee-file pair that crossed a similarity
/// threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEvidence {
    pub candidate_path: String,
    pub challengee_path: String,
    /// Length of the matched span in the candidate's original text; the
    /// weighting signal for aggregation
    pub lines_copied: usize,
    pub tfidf_sim: f64,
    pub leven_sim: f64,
    /// `tfidf_sim × leven_sim`
    pub combined_sim: f64,
}

/// Aggregate similarity verdict for one external repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoScore {
    pub repo_id: String,
    pub url: String,
    pub total_files_candidate: usize,
    pub matched_file_count: usize,
    pub tfidf_weighted: f64,
    pub leven_weighted: f64,
    pub combined_weighted: f64,
}

/// Discovery accumulator: external repo id → evidence collected for it.
pub type EvidenceMap = HashMap<String, Vec<FileEvidence>>;

/// Texts whose sizes differ by more than 2× are not worth a DP table.
pub fn size_parity_ok(len_a: usize, len_b: usize) -> bool {
    len_a <= len_b * 2 && len_b <= len_a * 2
}

/// Pick the repositories worth deep evaluation: pair ids with their
/// evidence counts, sort ascending, keep only counts above 1, and take the
/// last `min(n, len)` entries in reverse — a descending top-N.
pub fn top_n_repos(evidence: &EvidenceMap, n: usize) -> Vec<String> {
    let mut pairs: Vec<(&str, usize)> = evidence
        .iter()
        .map(|(repo, items)| (repo.as_str(), items.len()))
        .collect();
    pairs.sort_by(|x, y| x.1.cmp(&y.1).then_with(|| x.0.cmp(y.0)));
    pairs.retain(|&(_, count)| count > 1);

    let take = n.min(pairs.len());
    pairs
        .iter()
        .rev()
        .take(take)
        .map(|&(repo, _)| repo.to_owned())
        .collect()
}

/// Fold a repository's evidence into weighted scores: each file weighs in
/// proportion to its share of the total matched span length.
pub fn aggregate_score(
    repo_id: &str,
    total_files_candidate: usize,
    evidence: &[FileEvidence],
) -> RepoScore {
    let total_lines: usize = evidence.iter().map(|e| e.lines_copied).sum();

    let mut tfidf_weighted = 0.0;
    let mut leven_weighted = 0.0;
    let mut combined_weighted = 0.0;
    if total_lines > 0 {
        for item in evidence {
            let weight = item.lines_copied as f64 / total_lines as f64;
            tfidf_weighted += weight * item.tfidf_sim;
            leven_weighted += weight * item.leven_sim;
            combined_weighted += weight * item.combined_sim;
        }
    }

    RepoScore {
        repo_id: repo_id.to_owned(),
        url: format!("https://github.com/{repo_id}"),
        total_files_candidate,
        matched_file_count: evidence.len(),
        tfidf_weighted,
        leven_weighted,
        combined_weighted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(lines: usize, tfidf: f64, leven: f64) -> FileEvidence {
        FileEvidence {
            candidate_path: "src/a.rs".into(),
            challengee_path: "lib/b.rs".into(),
            lines_copied: lines,
            tfidf_sim: tfidf,
            leven_sim: leven,
            combined_sim: tfidf * leven,
        }
    }

    fn map_of(counts: &[(&str, usize)]) -> EvidenceMap {
        counts
            .iter()
            .map(|&(repo, n)| {
                (
                    repo.to_owned(),
                    (0..n).map(|_| evidence(10, 0.9, 0.9)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn parity_gate_fence_posts() {
        assert!(size_parity_ok(10, 20));
        assert!(!size_parity_ok(10, 21));
        assert!(size_parity_ok(20, 10));
        assert!(!size_parity_ok(21, 10));
        assert!(size_parity_ok(0, 0));
    }

    #[test]
    fn top_n_orders_by_count_descending() {
        let map = map_of(&[("u/low", 2), ("u/high", 5), ("u/mid", 3)]);
        assert_eq!(top_n_repos(&map, 8), vec!["u/high", "u/mid", "u/low"]);
    }

    #[test]
    fn top_n_drops_single_hit_repos() {
        let map = map_of(&[("u/one", 1), ("u/two", 2)]);
        assert_eq!(top_n_repos(&map, 8), vec!["u/two"]);
    }

    #[test]
    fn top_n_truncates_to_n() {
        let map = map_of(&[("u/a", 2), ("u/b", 3), ("u/c", 4), ("u/d", 5)]);
        let top = top_n_repos(&map, 2);
        assert_eq!(top, vec!["u/d", "u/c"]);
    }

    #[test]
    fn top_n_of_empty_map_is_empty() {
        assert!(top_n_repos(&EvidenceMap::new(), 8).is_empty());
    }

    #[test]
    fn aggregate_weights_by_lines_copied() {
        let items = vec![evidence(30, 0.9, 0.6), evidence(10, 0.5, 0.2)];
        let score = aggregate_score("u/r", 40, &items);
        // weights: 0.75 and 0.25
        assert!((score.tfidf_weighted - (0.75 * 0.9 + 0.25 * 0.5)).abs() < 1e-12);
        assert!((score.leven_weighted - (0.75 * 0.6 + 0.25 * 0.2)).abs() < 1e-12);
        assert!(
            (score.combined_weighted - (0.75 * 0.54 + 0.25 * 0.1)).abs() < 1e-12
        );
        assert_eq!(score.matched_file_count, 2);
        assert_eq!(score.url, "https://github.com/u/r");
    }

    #[test]
    fn aggregate_with_no_matched_spans_scores_zero() {
        let items = vec![evidence(0, 0.9, 0.9)];
        let score = aggregate_score("u/r", 5, &items);
        assert_eq!(score.tfidf_weighted, 0.0);
        assert_eq!(score.combined_weighted, 0.0);
    }
}
