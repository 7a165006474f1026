//! Evaluation phase — repo-to-repo deep comparison with weighted scoring
//!
//! Phase 2a is free: it re-aggregates the evidence discovery already
//! collected. Phase 2b is expensive: each chosen repository is cloned,
//! filtered, and matched file-by-file against the candidate, with a
//! combined char-level TF-IDF pruning the pairs before any edit-distance
//! table is built.

use super::progress::ProgressReporter;
use super::{aggregate_score, size_parity_ok, EvidenceMap, FileEvidence, RepoScore};
use crate::config::ScanConfig;
use crate::github::RepoCloner;
use crate::repo::{collect_files, is_extension_same, read_all};
use crate::text::{compute_similarity, truncate_utf8, NormalizedText};
use crate::tfidf::{cosine, tokenize_non_letter_chars, TfIdfModel, WeightMap};
use crate::CopytraceResult;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Phase 2a: fold the discovery evidence of each chosen repository into a
/// weighted score, best first.
pub fn preliminary_scores(
    evidence: &EvidenceMap,
    chosen: &[String],
    total_files_candidate: usize,
) -> Vec<RepoScore> {
    let mut scores: Vec<RepoScore> = chosen
        .iter()
        .filter_map(|repo_id| evidence.get(repo_id).map(|items| (repo_id, items)))
        .map(|(repo_id, items)| aggregate_score(repo_id, total_files_candidate, items))
        .collect();
    sort_by_combined(&mut scores);
    scores
}

/// Phase 2b: clone every chosen repository and score it against the whole
/// candidate, best first.
pub async fn run_deep_evaluation(
    config: &ScanConfig,
    candidate_files: &HashMap<PathBuf, String>,
    candidate_root: &Path,
    chosen: &[String],
    reporter: &dyn ProgressReporter,
) -> CopytraceResult<Vec<RepoScore>> {
    let mut scores = Vec::with_capacity(chosen.len());

    // Sequential across repos: each iteration holds one clone and one
    // corpus in memory at a time.
    for (done, repo_id) in chosen.iter().enumerate() {
        reporter.status(&format!("deep comparing {repo_id}"));

        match evaluate_repo(config, candidate_files, candidate_root, repo_id).await {
            Ok(Some(score)) => scores.push(score),
            Ok(None) => {
                tracing::info!("{repo_id}: skipped (file-count parity)");
            }
            Err(e) => {
                tracing::warn!("{repo_id}: deep evaluation failed: {e}");
            }
        }
        reporter.advance(done + 1, chosen.len());
    }

    reporter.complete();
    sort_by_combined(&mut scores);
    Ok(scores)
}

/// Clone and score one repository. `Ok(None)` means the file-count parity
/// gate rejected the pairing.
async fn evaluate_repo(
    config: &ScanConfig,
    candidate_files: &HashMap<PathBuf, String>,
    candidate_root: &Path,
    repo_id: &str,
) -> CopytraceResult<Option<RepoScore>> {
    let url = format!("https://github.com/{repo_id}");
    let clone = RepoCloner::clone_to_temp(&url)?;

    let challengee_paths = collect_files(&clone.root);
    let challengee_files: HashMap<PathBuf, String> = read_all(&challengee_paths)?
        .into_iter()
        .map(|(path, text)| {
            let cut = truncate_utf8(&text, config.text_max_length).to_owned();
            (path, cut)
        })
        .collect();

    if !size_parity_ok(candidate_files.len(), challengee_files.len()) {
        return Ok(None);
    }

    // One corpus over BOTH repos so the IDF weights reflect the pairing
    let mut model = TfIdfModel::with_tokenizer(tokenize_non_letter_chars);
    model.add_docs(&challengee_files.values().collect::<Vec<_>>());
    model.add_docs(
        &candidate_files
            .values()
            .map(|t| truncate_utf8(t, config.text_max_length))
            .collect::<Vec<_>>(),
    );

    let mut candidate_sorted: Vec<&PathBuf> = candidate_files.keys().collect();
    candidate_sorted.sort();
    let mut challengee_sorted: Vec<&PathBuf> = challengee_files.keys().collect();
    challengee_sorted.sort();

    let mut vector_memo: HashMap<&PathBuf, WeightMap> = HashMap::new();
    let mut evidence: Vec<FileEvidence> = Vec::new();

    for &cand_path in &candidate_sorted {
        let cand_text = truncate_utf8(&candidate_files[cand_path], config.text_max_length);
        let w1 = model.vector(cand_text);

        let mut matches: Vec<(&PathBuf, f64)> = Vec::new();
        for &chal_path in &challengee_sorted {
            if !is_extension_same(cand_path, chal_path) {
                continue;
            }
            let w2 = vector_memo
                .entry(chal_path)
                .or_insert_with(|| model.vector(&challengee_files[chal_path]));
            let similarity = cosine(&w1, w2);
            if similarity > config.tfidf_similarity_threshold {
                matches.push((chal_path, similarity));
                break;
            }
        }
        if matches.is_empty() {
            continue;
        }

        matches.sort_by(|x, y| y.1.partial_cmp(&x.1).unwrap_or(std::cmp::Ordering::Equal));
        let (best_path, tfidf_sim) = matches[0];

        let cand_norm = NormalizedText::parse(cand_text);
        let chal_norm = NormalizedText::parse(&challengee_files[best_path]);
        let similarity = compute_similarity(&cand_norm, &chal_norm);
        let leven_sim = similarity.percentage;

        evidence.push(FileEvidence {
            candidate_path: display_path(cand_path, candidate_root),
            challengee_path: display_path(best_path, &clone.root),
            lines_copied: similarity.span_a.len(),
            tfidf_sim,
            leven_sim,
            combined_sim: tfidf_sim * leven_sim,
        });
    }

    tracing::info!(
        "{repo_id}: {} of {} candidate files matched",
        evidence.len(),
        candidate_files.len()
    );
    Ok(Some(aggregate_score(
        repo_id,
        candidate_files.len(),
        &evidence,
    )))
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn sort_by_combined(scores: &mut [RepoScore]) {
    scores.sort_by(|x, y| {
        y.combined_weighted
            .partial_cmp(&x.combined_weighted)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
