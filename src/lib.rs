//! paperscout - a search and ranking pipeline for academic papers.
//!
//! paperscout fetches candidate papers from a bibliographic provider
//! (Semantic Scholar), normalizes the raw records, collapses near-duplicate
//! titles, and ranks what remains against the query — by embedding
//! similarity when an embedding endpoint is available, with a deterministic
//! term-overlap fallback otherwise.
//!
//! # Quick start
//!
//! ```no_run
//! use paperscout::{
//!     config::Config,
//!     embedding::OpenAiEmbedding,
//!     engine::SearchEngine,
//!     source::SemanticScholar,
//! };
//!
//! # async fn example() -> paperscout::error::Result<()> {
//! let config = Config::from_env()?;
//! let source = SemanticScholar::new(config.ss_api_key.clone())?;
//! let embedding = OpenAiEmbedding::new(
//!     config.embedding_url.clone(),
//!     config.embedding_api_key.clone(),
//!     config.embedding_model.clone(),
//! )?;
//!
//! let engine = SearchEngine::new(source, embedding)
//!     .with_default_top_k(config.default_top_k);
//! let results = engine.search("deep learning", Some(10), true).await?;
//! for paper in &results {
//!     println!("[{:.3}] {}", paper.score, paper.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod dedup;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod paper;
pub mod rank;
pub mod source;

pub use config::Config;
pub use embedding::{EmbeddingProvider, OpenAiEmbedding};
pub use engine::SearchEngine;
pub use error::{Error, Result};
pub use paper::{Paper, RawRecord};
pub use source::{SemanticScholar, SourceAdapter};
