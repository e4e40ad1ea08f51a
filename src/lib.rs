use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("{service} unavailable after {attempts} attempts: {source}")]
    UpstreamUnavailable {
        service: &'static str,
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid embedding response: {0}")]
    InvalidEmbeddingResponse(String),

    #[error("Vector dimension mismatch for point {id}: expected {expected}, got {actual}")]
    DimensionMismatch {
        id: i64,
        expected: usize,
        actual: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod chat;
pub mod commands;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod generator;
pub mod ingest;
pub mod server;
pub mod session;
pub mod vector;
