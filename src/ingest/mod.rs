
pub mod batcher;

use std::sync::Arc;

use tracing::{error, info};

use crate::Result;
use crate::database::Database;
use crate::database::models::{Article, NewArticle};
use crate::embeddings::EmbeddingProvider;
use crate::ingest::batcher::Batcher;
use crate::vector::{PointPayload, VectorPoint, VectorStore};

/// A document to be ingested: relational metadata first, vectors second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub title: String,
    pub content: String,
}

/// The fixed internal document set served by `POST /ingest`.
pub fn sample_documents(count: usize) -> Vec<SourceDocument> {
    (1..=count)
        .map(|i| SourceDocument {
            title: format!("Sample News Title {i}"),
            content: format!("This is the content of news article number {i}"),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngestReport {
    pub articles: usize,
    pub batches: usize,
}

/// Bulk-loads documents into the relational store and the vector index,
/// keeping ids consistent across both. Batches are processed strictly
/// sequentially; an embedding or upsert failure aborts the run, leaving
/// already-committed articles without vectors (documented, not repaired).
pub struct IngestionPipeline {
    database: Database,
    embeddings: Arc<dyn EmbeddingProvider>,
    vectors: Arc<dyn VectorStore>,
    batch_size: usize,
}

impl IngestionPipeline {
    pub fn new(
        database: Database,
        embeddings: Arc<dyn EmbeddingProvider>,
        vectors: Arc<dyn VectorStore>,
        batch_size: usize,
    ) -> Self {
        Self {
            database,
            embeddings,
            vectors,
            batch_size,
        }
    }

    pub async fn run(&self, documents: Vec<SourceDocument>) -> Result<IngestReport> {
        self.vectors.ensure_collection().await;

        info!(
            "Ingesting {} documents in batches of {}",
            documents.len(),
            self.batch_size
        );

        let mut report = IngestReport::default();
        let mut batcher: Batcher<Article> = Batcher::new(self.batch_size);

        let run = async {
            for document in documents {
                // Relational store first: its generated id keys the vector point.
                let article = self
                    .database
                    .insert_article(NewArticle {
                        title: document.title,
                        content: document.content,
                    })
                    .await?;
                report.articles += 1;

                if let Some(batch) = batcher.push(article) {
                    self.flush_batch(batch).await?;
                    report.batches += 1;
                }
            }

            if !batcher.is_empty() {
                self.flush_batch(batcher.drain()).await?;
                report.batches += 1;
            }

            Ok(())
        }
        .await;

        // Collection stats are observability only; a failed lookup never
        // changes the outcome of the run.
        if let Some(info) = self.vectors.info().await {
            info!(
                "Collection after ingestion: {:?} points ({:?})",
                info.points_count, info.status
            );
        }

        match run {
            Ok(()) => {
                info!(
                    "Ingestion complete: {} articles in {} batches",
                    report.articles, report.batches
                );
                Ok(report)
            }
            Err(e) => {
                error!(
                    "Ingestion aborted after {} articles, {} full batches: {}",
                    report.articles, report.batches, e
                );
                Err(e)
            }
        }
    }

    async fn flush_batch(&self, batch: Vec<Article>) -> Result<()> {
        let texts: Vec<String> = batch.iter().map(|a| a.content.clone()).collect();
        let embeddings = self.embeddings.embed(&texts).await?;

        let points: Vec<VectorPoint> = batch
            .into_iter()
            .zip(embeddings)
            .map(|(article, vector)| VectorPoint {
                id: article.id,
                vector,
                payload: PointPayload {
                    title: article.title,
                    content: article.content,
                },
            })
            .collect();

        self.vectors.upsert(points).await
    }
}
