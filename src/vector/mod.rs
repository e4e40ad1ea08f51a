
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::QdrantConfig;
use crate::{RagError, Result};

/// Metadata carried alongside each vector point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointPayload {
    pub title: String,
    pub content: String,
}

/// A vector point keyed by its originating article id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorPoint {
    pub id: i64,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

/// A nearest-neighbor hit with its similarity score.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    pub score: f32,
    pub payload: Option<PointPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionInfo {
    pub points_count: Option<u64>,
    pub status: Option<String>,
}

/// Owns the semantic index. Failure policy is part of the contract:
/// `upsert` is fatal (lost writes are unacceptable), `search` and `info`
/// degrade silently because retrieval is an optimization.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if it does not exist. Idempotent; failure is
    /// logged and non-fatal (subsequent writes then fail legitimately).
    async fn ensure_collection(&self);

    async fn upsert(&self, points: Vec<VectorPoint>) -> Result<()>;

    /// Returns up to `limit` nearest points, or an empty vec on any failure.
    async fn search(&self, vector: Vec<f32>, limit: usize) -> Vec<SearchHit>;

    async fn info(&self) -> Option<CollectionInfo>;
}

/// Qdrant-backed vector store over its REST API.
#[derive(Debug, Clone)]
pub struct QdrantStore {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
}

#[derive(Debug, Serialize)]
struct VectorParams {
    size: usize,
    distance: &'static str,
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    points: Vec<VectorPoint>,
}

#[derive(Debug, Serialize)]
struct SearchRequest {
    vector: Vec<f32>,
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    result: CollectionInfo,
}

impl QdrantStore {
    pub fn new(config: &QdrantConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            dimension: config.dimension,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    async fn collection_exists(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.collection_url())
            .send()
            .await
            .context("Failed to query collection existence")?;

        Ok(response.status().is_success())
    }

    async fn create_collection(&self) -> Result<()> {
        let request = CreateCollectionRequest {
            vectors: VectorParams {
                size: self.dimension,
                distance: "Cosine",
            },
        };

        self.client
            .put(self.collection_url())
            .json(&request)
            .send()
            .await
            .context("Failed to send create collection request")?
            .error_for_status()
            .context("Create collection request rejected")?;

        Ok(())
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn ensure_collection(&self) {
        match self.collection_exists().await {
            Ok(true) => {
                debug!("Collection \"{}\" already exists", self.collection);
            }
            Ok(false) => match self.create_collection().await {
                Ok(()) => info!("Created collection \"{}\"", self.collection),
                Err(e) => warn!(
                    "Failed to create collection \"{}\" (continuing without it): {}",
                    self.collection, e
                ),
            },
            Err(e) => warn!(
                "Failed to check collection \"{}\" (continuing without it): {}",
                self.collection, e
            ),
        }
    }

    async fn upsert(&self, points: Vec<VectorPoint>) -> Result<()> {
        // Reject the whole write on any dimension mismatch; the index would
        // otherwise store a vector that can never match the collection.
        for point in &points {
            if point.vector.len() != self.dimension {
                return Err(RagError::DimensionMismatch {
                    id: point.id,
                    expected: self.dimension,
                    actual: point.vector.len(),
                });
            }
        }

        let count = points.len();
        let request = UpsertRequest { points };

        self.client
            .put(format!("{}/points", self.collection_url()))
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::UpstreamUnavailable {
                service: "vector index",
                attempts: 1,
                source: anyhow!(e),
            })?
            .error_for_status()
            .map_err(|e| RagError::UpstreamUnavailable {
                service: "vector index",
                attempts: 1,
                source: anyhow!(e),
            })?;

        info!(
            "Upserted {} points into collection \"{}\"",
            count, self.collection
        );
        Ok(())
    }

    async fn search(&self, vector: Vec<f32>, limit: usize) -> Vec<SearchHit> {
        let request = SearchRequest {
            vector,
            limit,
            with_payload: true,
        };

        let result = async {
            let response = self
                .client
                .post(format!("{}/points/search", self.collection_url()))
                .json(&request)
                .send()
                .await?
                .error_for_status()?;
            response.json::<SearchResponse>().await
        }
        .await;

        match result {
            Ok(parsed) => parsed.result,
            Err(e) => {
                warn!("Vector search failed, returning no results: {}", e);
                Vec::new()
            }
        }
    }

    async fn info(&self) -> Option<CollectionInfo> {
        let result = async {
            let response = self
                .client
                .get(self.collection_url())
                .send()
                .await?
                .error_for_status()?;
            response.json::<CollectionResponse>().await
        }
        .await;

        match result {
            Ok(parsed) => Some(parsed.result),
            Err(e) => {
                warn!("Failed to get collection info: {}", e);
                None
            }
        }
    }
}
