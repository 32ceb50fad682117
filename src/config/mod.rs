//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `COLLIDE_*` environment variables.
//! The completion/embedding credential is read from `OPENAI_API_KEY` and is required.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read overrides on top of defaults. Algorithm policy
/// (thresholds, chunking, masking) lives in [`PipelineConfig`](crate::pipeline::PipelineConfig).
#[derive(Debug, Clone)]
pub struct Config {
    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Collection holding every indexed chunk. Default: `paper_chunks`.
    pub collection_name: String,

    /// API key for the completion and embedding services.
    pub openai_api_key: String,

    /// Optional OpenAI-compatible base URL (proxies, local gateways).
    pub openai_base_url: Option<String>,

    /// Chat model used for every judgment. Default: `gpt-4o-mini`.
    pub llm_model: String,

    /// Embedding model backing the text index. Default: `text-embedding-3-small`.
    pub embedding_model: String,

    /// Embedding dimension (collection vector size). Default: `1536`.
    pub embedding_dim: u64,

    /// Texts per embeddings request. Default: `256`, at most `2048`.
    pub embedding_batch_size: usize,

    /// Per-call completion timeout. Default: 30 seconds.
    pub llm_timeout: Duration,

    /// Comparison workers draining the task queue. Default: `2`.
    pub workers: usize,
}

/// Default Qdrant URL used when `COLLIDE_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default collection name used when `COLLIDE_COLLECTION` is not set.
pub const DEFAULT_COLLECTION_NAME: &str = "paper_chunks";

/// Default number of texts sent per embeddings request.
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 256;

/// Input cap of the OpenAI embeddings endpoint.
pub const MAX_EMBEDDING_BATCH_SIZE: usize = 2048;

impl Default for Config {
    fn default() -> Self {
        Self {
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            openai_api_key: String::new(),
            openai_base_url: None,
            llm_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dim: 1536,
            embedding_batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
            llm_timeout: Duration::from_secs(30),
            workers: 2,
        }
    }
}

impl Config {
    const ENV_QDRANT_URL: &'static str = "COLLIDE_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "COLLIDE_COLLECTION";
    pub const ENV_OPENAI_API_KEY: &'static str = "OPENAI_API_KEY";
    const ENV_OPENAI_BASE_URL: &'static str = "COLLIDE_OPENAI_BASE_URL";
    const ENV_LLM_MODEL: &'static str = "COLLIDE_LLM_MODEL";
    const ENV_EMBEDDING_MODEL: &'static str = "COLLIDE_EMBEDDING_MODEL";
    const ENV_EMBEDDING_DIM: &'static str = "COLLIDE_EMBEDDING_DIM";
    const ENV_EMBEDDING_BATCH_SIZE: &'static str = "COLLIDE_EMBEDDING_BATCH_SIZE";
    const ENV_LLM_TIMEOUT_SECS: &'static str = "COLLIDE_LLM_TIMEOUT_SECS";
    const ENV_WORKERS: &'static str = "COLLIDE_WORKERS";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// Fails with [`ConfigError::MissingEnvVar`] when `OPENAI_API_KEY` is absent or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let openai_api_key = parse_optional_string_from_env(Self::ENV_OPENAI_API_KEY).ok_or(
            ConfigError::MissingEnvVar {
                name: Self::ENV_OPENAI_API_KEY,
            },
        )?;

        let qdrant_url = parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url);
        let collection_name = parse_string_from_env(Self::ENV_COLLECTION, defaults.collection_name);
        let openai_base_url = parse_optional_string_from_env(Self::ENV_OPENAI_BASE_URL);
        let llm_model = parse_string_from_env(Self::ENV_LLM_MODEL, defaults.llm_model);
        let embedding_model =
            parse_string_from_env(Self::ENV_EMBEDDING_MODEL, defaults.embedding_model);
        let embedding_dim = parse_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim)?;
        let embedding_batch_size =
            parse_from_env(Self::ENV_EMBEDDING_BATCH_SIZE, defaults.embedding_batch_size)?;
        let llm_timeout = Duration::from_secs(parse_from_env(
            Self::ENV_LLM_TIMEOUT_SECS,
            defaults.llm_timeout.as_secs(),
        )?);
        let workers = parse_from_env(Self::ENV_WORKERS, defaults.workers)?;

        let config = Self {
            qdrant_url,
            collection_name,
            openai_api_key,
            openai_base_url,
            llm_model,
            embedding_model,
            embedding_dim,
            embedding_batch_size,
            llm_timeout,
            workers,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_QDRANT_URL,
                reason: "must not be empty".to_string(),
            });
        }
        if self.collection_name.trim().is_empty() {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_COLLECTION,
                reason: "must not be empty".to_string(),
            });
        }
        if self.embedding_dim == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_EMBEDDING_DIM,
                reason: "must be > 0".to_string(),
            });
        }
        if self.embedding_batch_size == 0 || self.embedding_batch_size > MAX_EMBEDDING_BATCH_SIZE {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_EMBEDDING_BATCH_SIZE,
                reason: format!("must be within 1..={MAX_EMBEDDING_BATCH_SIZE}"),
            });
        }
        if self.llm_timeout.is_zero() {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_LLM_TIMEOUT_SECS,
                reason: "must be > 0".to_string(),
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_WORKERS,
                reason: "must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) fn parse_string_from_env(var_name: &str, default: String) -> String {
    parse_optional_string_from_env(var_name).unwrap_or(default)
}

pub(crate) fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
    env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses `var_name` when set; a set-but-unparseable value is an error, not a silent default.
pub(crate) fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match parse_optional_string_from_env(var_name) {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name: var_name,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}
