//! Discovery phase — per-file code search feeding an evidence accumulator
//!
//! For a sampled subset of candidate files, extract the highest-IDF
//! keywords, search GitHub for them, and compare every hit against the
//! sampled file. Repositories collect evidence; the strongest go on to deep
//! evaluation.
//!
//! Concurrency shape: the outer loop over sampled files is sequential (the
//! search rate limiter is the bottleneck), while hits within one file fan
//! out under a 3-permit semaphore. The two TF-IDF models and the evidence
//! map are each behind their own exclusive lock, and locks are never held
//! across the DP or cosine computations.

use super::progress::ProgressReporter;
use super::{size_parity_ok, EvidenceMap, FileEvidence};
use crate::config::ScanConfig;
use crate::github::{SearchClient, SearchHit};
use crate::repo::sample_files;
use crate::text::{compute_similarity, truncate_utf8, NormalizedText};
use crate::tfidf::{cosine, tokenize_non_letter_chars, top_n_keywords, TfIdfModel};
use crate::CopytraceResult;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

/// What discovery learned, plus how much of the hit budget it spent.
#[derive(Debug)]
pub struct DiscoveryOutcome {
    pub evidence: EvidenceMap,
    pub hits_examined: usize,
}

/// Shared state for one file's hit batch.
struct HitContext {
    client: SearchClient,
    config: ScanConfig,
    char_tfidf: Arc<Mutex<TfIdfModel>>,
    evidence: Arc<Mutex<EvidenceMap>>,
    candidate_path: String,
    candidate_raw_len: usize,
    candidate_norm: NormalizedText,
}

/// Run phase 1: sample files, search for their keywords, compare hits, and
/// bucket evidence per external repository.
pub async fn run_discovery(
    config: &ScanConfig,
    client: &SearchClient,
    candidate_repo_id: &str,
    root: &Path,
    files: &HashMap<PathBuf, String>,
    reporter: &dyn ProgressReporter,
) -> CopytraceResult<DiscoveryOutcome> {
    let all_texts: Vec<&str> = files.values().map(String::as_str).collect();

    let mut keywords_model = TfIdfModel::new();
    keywords_model.add_docs(&all_texts);
    let keywords_tfidf = Mutex::new(keywords_model);

    let mut char_model = TfIdfModel::with_tokenizer(tokenize_non_letter_chars);
    char_model.add_docs(&all_texts);
    let char_tfidf = Arc::new(Mutex::new(char_model));

    let evidence = Arc::new(Mutex::new(EvidenceMap::new()));

    let paths: Vec<PathBuf> = files.keys().cloned().collect();
    let sampled = sample_files(&paths, config.files_for_parsing);
    tracing::info!(
        "discovery: {} of {} files sampled for search",
        sampled.len(),
        paths.len()
    );

    let mut hits_examined = 0usize;
    for (done, path) in sampled.iter().enumerate() {
        if hits_examined >= config.max_searched_files {
            tracing::info!(
                "discovery: hit budget of {} reached, stopping early",
                config.max_searched_files
            );
            break;
        }

        let display_path = path
            .strip_prefix(root)
            .unwrap_or(path)
            .display()
            .to_string();
        reporter.status(&format!("searching for {display_path}"));

        let raw = &files[path];
        let text = truncate_utf8(raw, config.text_max_length);

        let query = {
            let weights = keywords_tfidf.lock().await.vector(text);
            match build_query(path, &weights) {
                Some(q) => q,
                None => {
                    tracing::debug!("no keywords extractable from {display_path}, skipping");
                    reporter.advance(done + 1, sampled.len());
                    continue;
                }
            }
        };

        let hits = match client.search_code(&query, config.files_to_query).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("search for {display_path} failed: {e}");
                reporter.advance(done + 1, sampled.len());
                continue;
            }
        };
        let hits: Vec<SearchHit> = hits
            .into_iter()
            .filter(|hit| hit.repository.full_name != candidate_repo_id)
            .collect();
        hits_examined += hits.len();

        let ctx = Arc::new(HitContext {
            client: client.clone(),
            config: config.clone(),
            char_tfidf: Arc::clone(&char_tfidf),
            evidence: Arc::clone(&evidence),
            candidate_path: display_path.clone(),
            candidate_raw_len: raw.len(),
            candidate_norm: NormalizedText::parse(text),
        });

        let semaphore = Arc::new(Semaphore::new(config.hit_concurrency));
        let mut workers = Vec::with_capacity(hits.len());
        for hit in hits {
            let ctx = Arc::clone(&ctx);
            let semaphore = Arc::clone(&semaphore);
            workers.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return false;
                };
                process_hit(&ctx, hit).await
            }));
        }

        let mut kept = 0usize;
        for worker in workers {
            if worker.await.unwrap_or(false) {
                kept += 1;
            }
        }
        tracing::info!("results for {display_path}: {kept} hits kept");
        reporter.advance(done + 1, sampled.len());
    }

    reporter.complete();
    let evidence = Arc::try_unwrap(evidence)
        .map(Mutex::into_inner)
        .unwrap_or_default();
    Ok(DiscoveryOutcome {
        evidence,
        hits_examined,
    })
}

/// `kw1+kw2+kw3+kw4[+language:<ext>]`, or None when no keywords emerged.
fn build_query(path: &Path, weights: &crate::tfidf::WeightMap) -> Option<String> {
    let keywords = top_n_keywords(4, weights);
    if keywords.is_empty() {
        return None;
    }
    let mut query = keywords.join("+");
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        query.push_str("+language:");
        query.push_str(ext);
    }
    Some(query)
}

/// Fetch one hit and compare it against the sampled candidate file.
/// Returns whether the pair produced evidence.
async fn process_hit(ctx: &HitContext, hit: SearchHit) -> bool {
    let repo_name = hit.repository.full_name.clone();

    let challengee_raw = match ctx.client.fetch_raw(&hit).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("fetch of {}/{} failed: {e}", repo_name, hit.path);
            return false;
        }
    };

    if !size_parity_ok(ctx.candidate_raw_len, challengee_raw.len()) {
        tracing::debug!(
            "size parity: skipping {}/{} ({} vs {} bytes)",
            repo_name,
            hit.path,
            ctx.candidate_raw_len,
            challengee_raw.len()
        );
        return false;
    }

    let challengee_text = truncate_utf8(&challengee_raw, ctx.config.text_max_length);
    let challengee_norm = NormalizedText::parse(challengee_text);

    // CPU-heavy DP runs outside every lock
    let similarity = compute_similarity(&ctx.candidate_norm, &challengee_norm);
    let leven_sim = similarity.percentage;

    let (w1, w2) = {
        let mut model = ctx.char_tfidf.lock().await;
        model.add_docs(&[challengee_text]);
        let w1 = model.vector(&ctx.candidate_norm.normalized);
        let w2 = model.vector(&challengee_norm.normalized);
        (w1, w2)
    };
    let tfidf_sim = cosine(&w1, &w2);
    let combined_sim = leven_sim * tfidf_sim;

    if !exceeds_any_threshold(&ctx.config, tfidf_sim, leven_sim, combined_sim) {
        return false;
    }

    let item = FileEvidence {
        candidate_path: ctx.candidate_path.clone(),
        challengee_path: hit.path,
        lines_copied: similarity.span_a.len(),
        tfidf_sim,
        leven_sim,
        combined_sim,
    };
    ctx.evidence
        .lock()
        .await
        .entry(repo_name)
        .or_default()
        .push(item);
    true
}

/// A hit becomes evidence when ANY of its three scores clears its strict
/// threshold.
fn exceeds_any_threshold(config: &ScanConfig, tfidf: f64, leven: f64, combined: f64) -> bool {
    combined > config.combined_similarity_threshold
        || tfidf > config.tfidf_similarity_threshold
        || leven > config.leven_similarity_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_single_score_admits_a_hit() {
        let config = ScanConfig::default();
        assert!(exceeds_any_threshold(&config, 0.71, 0.0, 0.0));
        assert!(exceeds_any_threshold(&config, 0.0, 0.71, 0.0));
        assert!(exceeds_any_threshold(&config, 0.0, 0.0, 0.41));
        assert!(!exceeds_any_threshold(&config, 0.69, 0.69, 0.39));
    }

    #[test]
    fn thresholds_are_strict() {
        let config = ScanConfig::default();
        assert!(!exceeds_any_threshold(&config, 0.70, 0.70, 0.40));
    }

    #[test]
    fn only_admitted_hits_reach_the_evidence_map() {
        // three hits for one search: one clears the combined bar, two clear
        // nothing — exactly one evidence entry lands in r1's bucket
        let config = ScanConfig::default();
        let mut evidence = EvidenceMap::new();
        let hits = [
            ("r1/repo", 0.6, 0.83, 0.5),
            ("r2/repo", 0.3, 0.2, 0.06),
            ("r3/repo", 0.1, 0.4, 0.04),
        ];
        for (repo, tfidf, leven, combined) in hits {
            if exceeds_any_threshold(&config, tfidf, leven, combined) {
                evidence
                    .entry(repo.to_owned())
                    .or_default()
                    .push(FileEvidence {
                        candidate_path: "src/lib.rs".into(),
                        challengee_path: "lib.rs".into(),
                        lines_copied: 42,
                        tfidf_sim: tfidf,
                        leven_sim: leven,
                        combined_sim: combined,
                    });
            }
        }
        assert_eq!(evidence.get("r1/repo").map(Vec::len), Some(1));
        assert!(!evidence.contains_key("r2/repo"));
        assert!(!evidence.contains_key("r3/repo"));
    }
}
