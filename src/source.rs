use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::Result,
    paper::RawRecord,
};

pub const SEMANTIC_SCHOLAR_URL: &str =
    "https://api.semanticscholar.org/graph/v1";

const SEARCH_FIELDS: &str =
    "title,abstract,authors,externalIds,openAccessPdf,publicationDate,citationCount";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors internal to a source adapter. They never reach the pipeline:
/// [`SourceAdapter::fetch`] absorbs them into an empty result set.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error: {0}")]
    Api(String),
}

/// A bibliographic search backend.
///
/// `fetch` must not fail: on any internal error (network, auth, malformed
/// provider response) implementations log the cause and return an empty
/// list, so an upstream outage degrades the search instead of aborting it.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch up to `max_results` raw records matching `query`.
    async fn fetch(&self, query: &str, max_results: usize) -> Vec<RawRecord>;

    /// Provider label, used for logging and the records' `source` field.
    fn name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SsPaper>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SsPaper {
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    authors: Vec<SsAuthor>,
    external_ids: Option<SsExternalIds>,
    open_access_pdf: Option<SsOpenAccessPdf>,
    publication_date: Option<String>,
    citation_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SsAuthor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SsExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "ArXiv")]
    arxiv: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SsOpenAccessPdf {
    url: Option<String>,
}

/// Client for the Semantic Scholar Graph API paper search.
pub struct SemanticScholar {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholar {
    /// Create a client. Without an API key requests run against the public,
    /// more tightly rate-limited tier.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: SEMANTIC_SCHOLAR_URL.to_string(),
            api_key,
        })
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn try_fetch(
        &self,
        query: &str,
        max_results: usize,
    ) -> std::result::Result<Vec<RawRecord>, SourceError> {
        let limit = max_results.to_string();
        let mut request = self
            .client
            .get(format!("{}/paper/search", self.base_url))
            .query(&[
                ("query", query),
                ("limit", limit.as_str()),
                ("fields", SEARCH_FIELDS),
            ]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(format!("{status}: {body}")));
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed
            .data
            .into_iter()
            .take(max_results)
            .map(|paper| self.to_raw(paper))
            .collect())
    }

    /// Map one provider record onto the canonical raw-record keys.
    fn to_raw(&self, paper: SsPaper) -> RawRecord {
        let authors: Vec<String> = paper
            .authors
            .into_iter()
            .filter_map(|a| a.name)
            .collect();
        let (doi, arxiv_id) = match paper.external_ids {
            Some(ids) => (ids.doi, ids.arxiv),
            None => (None, None),
        };

        json!({
            "title": paper.title,
            "authors": authors,
            "abstract": paper.abstract_text,
            "published_date": paper.publication_date,
            "arxiv_id": arxiv_id,
            "doi": doi,
            "pdf_url": paper.open_access_pdf.and_then(|p| p.url),
            "citation_count": paper.citation_count,
            "source": self.name(),
        })
    }
}

#[async_trait]
impl SourceAdapter for SemanticScholar {
    async fn fetch(&self, query: &str, max_results: usize) -> Vec<RawRecord> {
        match self.try_fetch(query, max_results).await {
            Ok(records) => {
                info!(
                    count = records.len(),
                    source = self.name(),
                    "retrieved candidate records"
                );
                records
            }
            Err(err) => {
                error!(error = %err, source = self.name(), "fetch failed");
                Vec::new()
            }
        }
    }

    fn name(&self) -> &str {
        "semantic_scholar"
    }
}
