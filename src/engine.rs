use tracing::info;

use crate::{
    dedup::{deduplicate, DEFAULT_SIMILARITY_THRESHOLD},
    embedding::EmbeddingProvider,
    error::{Error, Result},
    normalize::normalize_all,
    paper::Paper,
    rank::rank,
    source::SourceAdapter,
};

/// Minimum trimmed query length accepted by [`SearchEngine::search`].
pub const MIN_QUERY_LEN: usize = 3;

/// Candidates requested from the source per result wanted. Fixed: if
/// deduplication removes more than half the batch the result set is
/// under-filled rather than re-fetched.
pub const OVER_FETCH_FACTOR: usize = 2;

/// Results returned when the caller does not ask for a specific count.
pub const DEFAULT_TOP_K: usize = 20;

/// The full search pipeline: fetch, normalize, deduplicate, rank, truncate.
///
/// Generic over its two collaborator seams so tests can drive it with stub
/// adapters. One engine value is cheap to share: `search` takes `&self` and
/// both collaborators are `Send + Sync`.
pub struct SearchEngine<S, E>
where
    S: SourceAdapter,
    E: EmbeddingProvider,
{
    source: S,
    embedding: E,
    default_top_k: usize,
}

impl<S, E> SearchEngine<S, E>
where
    S: SourceAdapter,
    E: EmbeddingProvider,
{
    pub fn new(source: S, embedding: E) -> Self {
        Self {
            source,
            embedding,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    /// Override the result count used when a caller passes `top_k: None`.
    pub fn with_default_top_k(mut self, default_top_k: usize) -> Self {
        self.default_top_k = default_top_k;
        self
    }

    /// Run a search and return the `top_k` most relevant papers.
    ///
    /// 1. Reject queries shorter than [`MIN_QUERY_LEN`] after trimming —
    ///    before any upstream work.
    /// 2. Fetch `OVER_FETCH_FACTOR × top_k` raw candidates.
    /// 3. Normalize, deduplicate, rank.
    /// 4. Truncate to `top_k`.
    ///
    /// A source outage yields `Ok` with an empty list; an embedding outage
    /// yields heuristic-ranked results. Only the query-length precondition
    /// produces an error.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
        use_embeddings: bool,
    ) -> Result<Vec<Paper>> {
        let query = query.trim();
        let len = query.chars().count();
        if len < MIN_QUERY_LEN {
            return Err(Error::QueryTooShort {
                len,
                min: MIN_QUERY_LEN,
            });
        }

        let top_k = top_k.unwrap_or(self.default_top_k);
        info!(query, top_k, use_embeddings, "starting search");

        let raws = self
            .source
            .fetch(query, top_k * OVER_FETCH_FACTOR)
            .await;

        let papers = normalize_all(&raws);
        let papers = deduplicate(papers, DEFAULT_SIMILARITY_THRESHOLD);
        let mut ranked =
            rank(papers, query, use_embeddings, &self.embedding).await;

        ranked.truncate(top_k);
        info!(count = ranked.len(), "returning results");
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{embedding::EmbeddingError, paper::RawRecord};

    /// Serves a fixed record set and counts fetches.
    struct StubSource {
        records: Vec<RawRecord>,
        fetches: AtomicUsize,
        last_max_results: AtomicUsize,
    }

    impl StubSource {
        fn new(records: Vec<RawRecord>) -> Self {
            Self {
                records,
                fetches: AtomicUsize::new(0),
                last_max_results: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SourceAdapter for StubSource {
        async fn fetch(&self, _query: &str, max_results: usize) -> Vec<RawRecord> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.last_max_results.store(max_results, Ordering::SeqCst);
            self.records.iter().take(max_results).cloned().collect()
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    struct NoEmbedding;

    #[async_trait]
    impl EmbeddingProvider for NoEmbedding {
        async fn embed(
            &self,
            _text: &str,
        ) -> std::result::Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::Api("unavailable".to_string()))
        }

        fn model_name(&self) -> &str {
            "none"
        }
    }

    fn engine(
        records: Vec<RawRecord>,
    ) -> SearchEngine<StubSource, NoEmbedding> {
        SearchEngine::new(StubSource::new(records), NoEmbedding)
    }

    #[tokio::test]
    async fn short_query_rejected_before_fetch() {
        let eng = engine(vec![json!({"title": "anything"})]);
        let err = eng.search("ab", Some(5), true).await.unwrap_err();

        match err {
            Error::QueryTooShort { len, min } => {
                assert_eq!(len, 2);
                assert_eq!(min, MIN_QUERY_LEN);
            }
            other => panic!("expected QueryTooShort, got {other}"),
        }
        assert_eq!(eng.source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn whitespace_does_not_rescue_short_query() {
        let eng = engine(vec![]);
        assert!(eng.search("  a  ", Some(5), false).await.is_err());
    }

    #[tokio::test]
    async fn over_fetches_twice_top_k() {
        let eng = engine(vec![]);
        eng.search("quantum computing", Some(7), false).await.unwrap();
        assert_eq!(eng.source.last_max_results.load(Ordering::SeqCst), 14);
    }

    #[tokio::test]
    async fn unset_top_k_uses_default() {
        let eng = engine(vec![]).with_default_top_k(4);
        eng.search("quantum computing", None, false).await.unwrap();
        assert_eq!(eng.source.last_max_results.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn source_outage_degrades_to_empty_result() {
        // StubSource with no records behaves like an absorbed failure.
        let eng = engine(vec![]);
        let results = eng.search("deep learning", Some(5), true).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn end_to_end_dedup_rank_truncate() {
        let eng = engine(vec![
            json!({"title": "Deep Learning for NLP"}),
            json!({"title": "Deep Learning for NLP."}),
            json!({"title": "Cooking Recipes"}),
        ]);

        let results =
            eng.search("deep learning", Some(2), false).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Deep Learning for NLP");
        assert_eq!(results[1].title, "Cooking Recipes");
        assert!(results[0].score > 0.0);
        assert_eq!(results[1].score, 0.0);
    }

    #[tokio::test]
    async fn truncates_to_top_k() {
        // Titles dissimilar enough to all survive deduplication.
        let eng = engine(vec![
            json!({"title": "Quantum Computing Advances"}),
            json!({"title": "Protein Folding Dynamics"}),
            json!({"title": "Dark Matter Halos"}),
            json!({"title": "Reinforcement Learning Agents"}),
            json!({"title": "Soil Microbiome Diversity"}),
        ]);

        let results = eng.search("survey", Some(3), false).await.unwrap();
        assert_eq!(results.len(), 3);
    }
}
