#[cfg(test)]
mod tests;

use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EmbeddingConfig;
use crate::{RagError, Result};

/// Turns text into fixed-dimension vectors, batched. Implementations must
/// return exactly one vector per input, in input order, each of
/// `dimension()` length.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn dimension(&self) -> usize;

    /// Convenience wrapper for the single-text case (query embedding).
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::InvalidEmbeddingResponse("empty batch result".to_string()))
    }
}

/// Client for the Jina embeddings API with retry and a deterministic demo
/// fallback when no API key is configured.
#[derive(Debug, Clone)]
pub struct JinaClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
    max_retries: u32,
    retry_delay: Duration,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedItem>,
}

#[derive(Debug, Deserialize)]
struct EmbedItem {
    embedding: Vec<f32>,
}

impl JinaClient {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        if config.api_key.is_none() {
            warn!("No embedding API key configured; using deterministic demo fallback embeddings");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build embedding HTTP client: {e}"))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            dimension: config.dimension,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    async fn call_with_retry(&self, texts: &[String], api_key: &str) -> Result<EmbedResponse> {
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            debug!(
                "Embedding request attempt {}/{} for {} texts",
                attempt,
                self.max_retries,
                texts.len()
            );

            let result = self
                .client
                .post(&self.api_url)
                .bearer_auth(api_key)
                .json(&request)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status);

            match result {
                Ok(response) => match response.json::<EmbedResponse>().await {
                    Ok(parsed) => return Ok(parsed),
                    Err(e) => {
                        return Err(RagError::InvalidEmbeddingResponse(format!(
                            "failed to parse response body: {e}"
                        )));
                    }
                },
                Err(e) => {
                    warn!(
                        "Embedding call failed on attempt {}/{}: {}",
                        attempt, self.max_retries, e
                    );
                    last_error = Some(e);

                    // Linearly increasing delay between attempts.
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay * attempt).await;
                    }
                }
            }
        }

        Err(RagError::UpstreamUnavailable {
            service: "embedding backend",
            attempts: self.max_retries,
            source: last_error
                .map(anyhow::Error::from)
                .unwrap_or_else(|| anyhow!("embedding request failed")),
        })
    }

    fn validate(&self, vectors: &[Vec<f32>], expected_count: usize) -> Result<()> {
        if vectors.len() != expected_count {
            return Err(RagError::InvalidEmbeddingResponse(format!(
                "expected {} embeddings, got {}",
                expected_count,
                vectors.len()
            )));
        }
        for (idx, vector) in vectors.iter().enumerate() {
            if vector.is_empty() || vector.len() != self.dimension {
                return Err(RagError::InvalidEmbeddingResponse(format!(
                    "embedding {} has dimension {}, expected {}",
                    idx,
                    vector.len(),
                    self.dimension
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for JinaClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let Some(api_key) = &self.api_key else {
            // Demo fallback: constant zero vectors, no network call.
            debug!("Returning {} demo fallback embeddings", texts.len());
            return Ok(vec![vec![0.0; self.dimension]; texts.len()]);
        };

        let response = self.call_with_retry(texts, api_key).await?;
        let vectors: Vec<Vec<f32>> = response.data.into_iter().map(|d| d.embedding).collect();
        self.validate(&vectors, texts.len())?;

        debug!("Generated {} embeddings", vectors.len());
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
