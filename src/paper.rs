use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A loosely-typed record emitted by a source adapter before normalization.
///
/// Always a JSON object. Adapters map their provider-specific response
/// shapes onto the canonical keys (`title`, `authors`, `abstract`,
/// `published_date`, `arxiv_id`, `doi`, `pdf_url`, `citation_count`,
/// `source`); the normalizer reads those keys and nothing else. Absent and
/// `null` keys are treated the same.
pub type RawRecord = serde_json::Value;

/// A normalized bibliographic record flowing through the pipeline.
///
/// Constructed once by [`crate::normalize::normalize`]; immutable afterwards
/// except for `score`, which the ranker sets exactly once per search. The
/// core text fields (`title`, `authors`, `abstract_text`, `source`) are
/// always present, possibly as their documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,

    /// Author display names, in publication order. May be empty.
    pub authors: Vec<String>,

    #[serde(rename = "abstract")]
    pub abstract_text: String,

    pub published_date: Option<NaiveDate>,

    pub arxiv_id: Option<String>,

    pub doi: Option<String>,

    pub pdf_url: Option<String>,

    /// Name of the provider this record came from; `"unknown"` if the
    /// adapter could not say.
    pub source: String,

    /// Relevance to the query. 0.0 (and meaningless) until ranked.
    pub score: f32,

    pub citation_count: Option<u64>,
}

impl Paper {
    /// A paper with every field at its documented default.
    pub fn empty() -> Self {
        Self {
            title: String::new(),
            authors: Vec::new(),
            abstract_text: String::new(),
            published_date: None,
            arxiv_id: None,
            doi: None,
            pdf_url: None,
            source: "unknown".to_string(),
            score: 0.0,
            citation_count: None,
        }
    }
}
