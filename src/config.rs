use crate::{
    embedding::{DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_URL},
    engine::DEFAULT_TOP_K,
    error::{Error, Result},
};

pub const SS_API_KEY_ENV: &str = "PAPERSCOUT_SS_API_KEY";
pub const EMBEDDING_URL_ENV: &str = "PAPERSCOUT_EMBEDDING_URL";
pub const EMBEDDING_API_KEY_ENV: &str = "PAPERSCOUT_EMBEDDING_API_KEY";
pub const EMBEDDING_MODEL_ENV: &str = "PAPERSCOUT_EMBEDDING_MODEL";
pub const DEFAULT_TOP_K_ENV: &str = "PAPERSCOUT_DEFAULT_TOP_K";

/// Runtime configuration, resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Semantic Scholar API key; the public tier is used when absent.
    pub ss_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible embeddings endpoint.
    pub embedding_url: String,

    pub embedding_api_key: Option<String>,

    pub embedding_model: String,

    /// Result count when the caller does not pass one.
    pub default_top_k: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ss_api_key: None,
            embedding_url: DEFAULT_EMBEDDING_URL.to_string(),
            embedding_api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            default_top_k: DEFAULT_TOP_K,
        }
    }
}

impl Config {
    /// Resolve configuration from `PAPERSCOUT_*` environment variables,
    /// falling back to the crate defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let default_top_k = match std::env::var(DEFAULT_TOP_K_ENV) {
            Ok(raw) => raw.parse().map_err(|_| {
                Error::Config(format!(
                    "{DEFAULT_TOP_K_ENV} must be a positive integer, got {raw:?}"
                ))
            })?,
            Err(_) => DEFAULT_TOP_K,
        };
        if default_top_k == 0 {
            return Err(Error::Config(format!(
                "{DEFAULT_TOP_K_ENV} must be at least 1"
            )));
        }

        Ok(Self {
            ss_api_key: env_nonempty(SS_API_KEY_ENV),
            embedding_url: env_nonempty(EMBEDDING_URL_ENV)
                .unwrap_or_else(|| DEFAULT_EMBEDDING_URL.to_string()),
            embedding_api_key: env_nonempty(EMBEDDING_API_KEY_ENV),
            embedding_model: env_nonempty(EMBEDDING_MODEL_ENV)
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            default_top_k,
        })
    }
}

/// A set-but-empty variable is treated as unset.
fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
