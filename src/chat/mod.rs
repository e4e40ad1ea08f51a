
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::database::Database;
use crate::database::models::NewInteraction;
use crate::embeddings::EmbeddingProvider;
use crate::generator::AnswerGenerator;
use crate::session::{ContextTurn, SessionContextStore};
use crate::vector::{SearchHit, VectorStore};
use crate::{RagError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub sources: Vec<String>,
}

/// Per-request orchestrator: session context + retrieval in, generated
/// answer out, with a durable log write on the way.
///
/// Stage failure policy: context fetch and retrieval degrade to empty,
/// the log append is fatal (it is the authoritative record), the context
/// update is best-effort.
pub struct ChatPipeline {
    database: Database,
    session_store: Arc<dyn SessionContextStore>,
    embeddings: Arc<dyn EmbeddingProvider>,
    vectors: Arc<dyn VectorStore>,
    generator: AnswerGenerator,
    top_k: usize,
}

impl ChatPipeline {
    pub fn new(
        database: Database,
        session_store: Arc<dyn SessionContextStore>,
        embeddings: Arc<dyn EmbeddingProvider>,
        vectors: Arc<dyn VectorStore>,
        generator: AnswerGenerator,
        top_k: usize,
    ) -> Self {
        Self {
            database,
            session_store,
            embeddings,
            vectors,
            generator,
            top_k,
        }
    }

    pub async fn handle(&self, session_id: &str, query: &str) -> Result<ChatResponse> {
        if session_id.trim().is_empty() || query.trim().is_empty() {
            return Err(RagError::Validation(
                "sessionId and query are required".to_string(),
            ));
        }

        let mut context = self.session_store.get(session_id).await;
        let retrieved = self.retrieve(query).await;
        let context_text = compose_context(&retrieved, &context);

        // Latency is measured across the generation call only.
        let started = Instant::now();
        let response = self.generator.answer(&context_text, query).await;
        let response_time_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);

        // Durable path: losing the log loses the audit trail.
        self.database
            .append_interaction(NewInteraction {
                session_id: session_id.to_string(),
                user_query: query.to_string(),
                llm_response: response.clone(),
                response_time_ms,
            })
            .await?;

        // Accelerator path: a lost context write only degrades future turns.
        context.push(ContextTurn {
            query: query.to_string(),
            response: response.clone(),
        });
        self.session_store.set(session_id, context).await;

        let sources = retrieved
            .iter()
            .filter_map(|hit| hit.payload.as_ref())
            .map(|payload| payload.title.clone())
            .filter(|title| !title.is_empty())
            .collect();

        Ok(ChatResponse { response, sources })
    }

    /// Embed the query and search the index. Every failure on this path,
    /// including an invalid embedding response, degrades to an empty
    /// retrieval set: retrieval is an optimization, not a precondition.
    async fn retrieve(&self, query: &str) -> Vec<SearchHit> {
        let vector = match self.embeddings.embed_one(query).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!("Query embedding failed, continuing without retrieval: {}", e);
                return Vec::new();
            }
        };

        let hits = self.vectors.search(vector, self.top_k).await;
        debug!("Retrieved {} passages for query", hits.len());
        hits
    }
}

/// Retrieved passages in rank order, then prior turns as alternating
/// `Q:`/`A:` lines in chronological order.
fn compose_context(retrieved: &[SearchHit], turns: &[ContextTurn]) -> String {
    let passages = retrieved
        .iter()
        .filter_map(|hit| hit.payload.as_ref())
        .map(|payload| payload.content.as_str())
        .filter(|content| !content.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let history = turns
        .iter()
        .map(|turn| format!("Q: {}\nA: {}", turn.query, turn.response))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{passages}\n\n{history}")
}
