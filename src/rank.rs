use std::collections::HashSet;

use tracing::{debug, warn};

use crate::{
    embedding::{EmbeddingError, EmbeddingProvider},
    paper::Paper,
};

/// Abstracts are cut to this many chars before embedding, to bound cost.
pub const ABSTRACT_SNIPPET_CHARS: usize = 500;

/// Rank papers by relevance to `query`, most relevant first.
///
/// Sets every paper's `score` and returns the batch sorted by descending
/// score; ties keep their input order (the sort is stable). When
/// `use_embeddings` is set, embedding similarity is attempted for the whole
/// batch; any provider failure falls back to the lexical heuristic for the
/// whole batch, so scores within one result set always share a scale.
/// An empty input returns empty without touching the provider.
pub async fn rank<E: EmbeddingProvider>(
    papers: Vec<Paper>,
    query: &str,
    use_embeddings: bool,
    provider: &E,
) -> Vec<Paper> {
    if papers.is_empty() {
        return papers;
    }

    let scores = if use_embeddings {
        match embedding_scores(&papers, query, provider).await {
            Ok(scores) => {
                debug!(
                    count = papers.len(),
                    model = provider.model_name(),
                    "ranked with embeddings"
                );
                scores
            }
            Err(err) => {
                warn!(error = %err, "embedding scoring failed, falling back to heuristics");
                heuristic_scores(&papers, query)
            }
        }
    } else {
        heuristic_scores(&papers, query)
    };

    sort_by_score(papers, scores)
}

/// Embedding-similarity scores for a batch of papers.
///
/// One embedding for the query, one per paper scoring text, cosine
/// similarity between them. Fails as a whole if any embedding fails.
pub async fn embedding_scores<E: EmbeddingProvider>(
    papers: &[Paper],
    query: &str,
    provider: &E,
) -> Result<Vec<f32>, EmbeddingError> {
    let query_embedding = provider.embed(query).await?;

    let texts: Vec<String> = papers.iter().map(scoring_text).collect();
    let paper_embeddings = provider.embed_batch(&texts).await?;

    Ok(paper_embeddings
        .iter()
        .map(|embedding| cosine_similarity(&query_embedding, embedding))
        .collect())
}

/// Deterministic lexical scores: term overlap between the query and each
/// paper, with title matches weighted double.
///
/// `score = (2·|q ∩ title| + |q ∩ abstract|) / (|q| + 1)`, all term sets
/// lower-cased and whitespace-split. The `+1` keeps very short queries from
/// dividing by zero and dampens their scores. Pure, never fails.
pub fn heuristic_scores(papers: &[Paper], query: &str) -> Vec<f32> {
    let query_terms = term_set(query);

    papers
        .iter()
        .map(|paper| {
            let title_terms = term_set(&paper.title);
            let abstract_terms = term_set(&paper.abstract_text);

            let title_matches = query_terms.intersection(&title_terms).count();
            let abstract_matches =
                query_terms.intersection(&abstract_terms).count();

            (2 * title_matches + abstract_matches) as f32
                / (query_terms.len() + 1) as f32
        })
        .collect()
}

/// The text a paper is embedded as: title plus a bounded abstract prefix.
pub fn scoring_text(paper: &Paper) -> String {
    let snippet: String = paper
        .abstract_text
        .chars()
        .take(ABSTRACT_SNIPPET_CHARS)
        .collect();
    format!("{} {}", paper.title, snippet)
}

/// Cosine similarity between two vectors, in `[-1, 1]`.
///
/// Returns 0.0 for mismatched dimensions or a zero-magnitude operand — a
/// malformed provider response must degrade, not panic.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

fn term_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn sort_by_score(papers: Vec<Paper>, scores: Vec<f32>) -> Vec<Paper> {
    let mut scored: Vec<Paper> = papers
        .into_iter()
        .zip(scores)
        .map(|(mut paper, score)| {
            paper.score = score;
            paper
        })
        .collect();

    // Stable sort: equal scores keep their input order.
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    scored
}
