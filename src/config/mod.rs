use std::env;

use thiserror::Error;
use url::Url;

pub const EMBEDDING_DIMENSION: usize = 768;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub embedding: EmbeddingConfig,
    pub qdrant: QdrantConfig,
    pub generation: GenerationConfig,
    pub chat: ChatConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub dimension: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QdrantConfig {
    pub url: String,
    pub collection: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub top_k: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    pub batch_size: usize,
    pub sample_count: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL for {0}: {1}")]
    InvalidUrl(&'static str, String),
    #[error("Invalid port: {0}")]
    InvalidPort(String),
    #[error("Invalid batch size: {0} (must be between 1 and 1000)")]
    InvalidBatchSize(usize),
    #[error("Invalid top-k: {0} (must be between 1 and 100)")]
    InvalidTopK(usize),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: "news_rag.db".to_string(),
            },
            embedding: EmbeddingConfig {
                api_url: "https://api.jina.ai/v1/embeddings".to_string(),
                api_key: None,
                model: "jina-embeddings-v2-base-en".to_string(),
                dimension: EMBEDDING_DIMENSION,
                timeout_secs: 10,
                max_retries: 3,
                retry_delay_ms: 500,
            },
            qdrant: QdrantConfig {
                url: "http://localhost:6333".to_string(),
                collection: "news_vectors".to_string(),
                dimension: EMBEDDING_DIMENSION,
            },
            generation: GenerationConfig {
                api_url: "https://generativelanguage.googleapis.com".to_string(),
                api_key: None,
                model: "gemini-2.5-flash".to_string(),
            },
            chat: ChatConfig { top_k: 5 },
            ingest: IngestConfig {
                batch_size: 10,
                sample_count: 50,
            },
        }
    }
}

impl Config {
    /// Build configuration from environment variables, falling back to
    /// defaults for anything unset. Missing credentials are not an error:
    /// they select the deterministic offline fallbacks instead.
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Self::default();

        if let Ok(port) = env::var("PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| crate::RagError::Config(format!("invalid PORT: {port}")))?;
        }
        if let Ok(url) = env::var("DATABASE_URL") {
            config.database.url = url;
        }
        config.embedding.api_key = env::var("JINA_API_KEY").ok().filter(|k| !k.is_empty());
        if let Ok(url) = env::var("JINA_URL") {
            config.embedding.api_url = url;
        }
        if let Ok(url) = env::var("QDRANT_URL") {
            config.qdrant.url = url;
        }
        if let Ok(collection) = env::var("QDRANT_COLLECTION") {
            config.qdrant.collection = collection;
        }
        config.generation.api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        if let Ok(url) = env::var("GEMINI_URL") {
            config.generation.api_url = url;
        }
        if let Ok(top_k) = env::var("CHAT_TOP_K") {
            config.chat.top_k = top_k
                .parse()
                .map_err(|_| crate::RagError::Config(format!("invalid CHAT_TOP_K: {top_k}")))?;
        }
        if let Ok(batch) = env::var("INGEST_BATCH_SIZE") {
            config.ingest.batch_size = batch.parse().map_err(|_| {
                crate::RagError::Config(format!("invalid INGEST_BATCH_SIZE: {batch}"))
            })?;
        }

        config
            .validate()
            .map_err(|e| crate::RagError::Config(e.to_string()))?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort(self.server.port.to_string()));
        }
        Url::parse(&self.embedding.api_url)
            .map_err(|_| ConfigError::InvalidUrl("embedding", self.embedding.api_url.clone()))?;
        Url::parse(&self.qdrant.url)
            .map_err(|_| ConfigError::InvalidUrl("qdrant", self.qdrant.url.clone()))?;
        Url::parse(&self.generation.api_url)
            .map_err(|_| ConfigError::InvalidUrl("generation", self.generation.api_url.clone()))?;

        if self.qdrant.collection.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "qdrant collection",
                self.qdrant.collection.clone(),
            ));
        }
        if self.embedding.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "embedding model",
                self.embedding.model.clone(),
            ));
        }
        if self.ingest.batch_size == 0 || self.ingest.batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(self.ingest.batch_size));
        }
        if self.chat.top_k == 0 || self.chat.top_k > 100 {
            return Err(ConfigError::InvalidTopK(self.chat.top_k));
        }

        Ok(())
    }
}
