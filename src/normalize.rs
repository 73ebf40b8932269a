use chrono::NaiveDate;

use crate::paper::{Paper, RawRecord};

/// Convert a raw source record into a [`Paper`].
///
/// Total function: absent or malformed fields degrade to documented
/// defaults instead of failing, so partial upstream data never aborts the
/// pipeline. Missing `title`/`abstract` become empty strings (the abstract
/// is whitespace-trimmed), missing `authors` an empty list, missing
/// `source` the literal `"unknown"`; identifiers, date, and URL default to
/// `None`.
pub fn normalize(raw: &RawRecord) -> Paper {
    let title = str_field(raw, "title").unwrap_or_default();

    let authors = raw
        .get("authors")
        .and_then(|v| v.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let abstract_text = str_field(raw, "abstract")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let published_date = str_field(raw, "published_date")
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok());

    let source =
        str_field(raw, "source").unwrap_or_else(|| "unknown".to_string());

    Paper {
        title,
        authors,
        abstract_text,
        published_date,
        arxiv_id: str_field(raw, "arxiv_id"),
        doi: str_field(raw, "doi"),
        pdf_url: str_field(raw, "pdf_url"),
        source,
        score: 0.0,
        citation_count: raw.get("citation_count").and_then(|v| v.as_u64()),
    }
}

/// Normalize a batch of raw records, preserving input order.
pub fn normalize_all(raws: &[RawRecord]) -> Vec<Paper> {
    raws.iter().map(normalize).collect()
}

fn str_field(raw: &RawRecord, key: &str) -> Option<String> {
    raw.get(key).and_then(|v| v.as_str()).map(str::to_string)
}
