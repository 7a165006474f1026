//! Result tables — one row per challengee repository
//!
//! A score cell turns green when it beats its threshold: a green cell in
//! any column means the candidate is likely a copy of that repository.

use crate::config::ScanConfig;
use crate::pipeline::RepoScore;
use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};

#[derive(Tabled)]
struct ScoreRow {
    #[tabled(rename = "Repo URL")]
    url: String,
    #[tabled(rename = "Files Matched")]
    matched: String,
    #[tabled(rename = "TFIDF Weighted")]
    tfidf: String,
    #[tabled(rename = "Argmin Leven Weighted")]
    leven: String,
    #[tabled(rename = "Combined Sim Weighted")]
    combined: String,
}

fn score_cell(value: f64, threshold: f64) -> String {
    let text = format!("{value:.4}");
    if value > threshold {
        text.green().to_string()
    } else {
        text
    }
}

/// Render a ranking table for `scores`.
pub fn render_scores(
    title: &str,
    candidate: &str,
    scores: &[RepoScore],
    config: &ScanConfig,
) -> String {
    let rows: Vec<ScoreRow> = scores
        .iter()
        .map(|score| ScoreRow {
            url: score.url.clone(),
            matched: format!(
                "{}/{}",
                score.matched_file_count, score.total_files_candidate
            ),
            tfidf: score_cell(score.tfidf_weighted, config.tfidf_similarity_threshold),
            leven: score_cell(score.leven_weighted, config.leven_similarity_threshold),
            combined: score_cell(
                score.combined_weighted,
                config.combined_similarity_threshold,
            ),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(TableStyle::sharp());

    format!(
        "{title}\nRepository under investigation: {candidate}\n\
         A green value means the candidate likely copies that repository.\n{table}"
    )
}
