
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::RagError;
use crate::chat::ChatPipeline;
use crate::config::Config;
use crate::database::Database;
use crate::embeddings::JinaClient;
use crate::generator::AnswerGenerator;
use crate::ingest::{IngestionPipeline, sample_documents};
use crate::session::{InMemorySessionStore, SessionContextStore};
use crate::vector::{QdrantStore, VectorStore};

pub struct AppState {
    pub chat: ChatPipeline,
    pub ingest: IngestionPipeline,
    pub database: Database,
    pub session_store: Arc<dyn SessionContextStore>,
    pub sample_count: usize,
}

/// Maps the error taxonomy onto HTTP statuses: validation failures are the
/// caller's fault (400), everything else is a 500 with detail kept in the
/// server-side logs.
pub struct ApiError(RagError);

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(RagError::Other(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            RagError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            other => {
                error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/ingest", post(ingest))
        .route("/chat", post(chat))
        .route(
            "/history/:session_id",
            get(get_history).delete(delete_history),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> &'static str {
    "API is running..."
}

async fn ingest(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let report = state.ingest.run(sample_documents(state.sample_count)).await?;

    Ok(Json(json!({
        "message": format!("Successfully ingested {} news articles", report.articles)
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    session_id: Option<String>,
    query: Option<String>,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Reject before any pipeline stage runs.
    let (Some(session_id), Some(query)) = (request.session_id, request.query) else {
        return Err(RagError::Validation("sessionId and query are required".to_string()).into());
    };

    let response = state.chat.handle(&session_id, &query).await?;
    Ok(Json(response))
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state.database.get_history(&session_id).await?;
    Ok(Json(json!({ "sessionId": session_id, "history": history })))
}

async fn delete_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.database.delete_history(&session_id).await?;
    // Context cache clear is best-effort by construction.
    state.session_store.clear(&session_id).await;

    Ok(Json(json!({ "message": format!("Session {session_id} cleared") })))
}

/// Wire up production components from configuration.
pub async fn build_state(config: &Config) -> crate::Result<Arc<AppState>> {
    let database = Database::new(&config.database.url).await?;
    let embeddings = Arc::new(JinaClient::new(&config.embedding)?);
    let vectors = Arc::new(QdrantStore::new(&config.qdrant));
    let session_store: Arc<dyn SessionContextStore> = Arc::new(InMemorySessionStore::new());
    let generator = AnswerGenerator::new(&config.generation);

    let chat = ChatPipeline::new(
        database.clone(),
        Arc::clone(&session_store),
        Arc::clone(&embeddings) as Arc<dyn crate::embeddings::EmbeddingProvider>,
        Arc::clone(&vectors) as Arc<dyn VectorStore>,
        generator,
        config.chat.top_k,
    );
    let ingest = IngestionPipeline::new(
        database.clone(),
        embeddings as Arc<dyn crate::embeddings::EmbeddingProvider>,
        Arc::clone(&vectors) as Arc<dyn VectorStore>,
        config.ingest.batch_size,
    );

    // The collection is a precondition for all index reads/writes; creating
    // it here is idempotent and failure is non-fatal by contract.
    vectors.ensure_collection().await;

    Ok(Arc::new(AppState {
        chat,
        ingest,
        database,
        session_store,
        sample_count: config.ingest.sample_count,
    }))
}

pub async fn serve(config: Config) -> crate::Result<()> {
    let state = build_state(&config).await?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.server.port)).await?;
    info!("Server running on port {}", config.server.port);

    axum::serve(listener, app)
        .await
        .map_err(|e| RagError::Other(anyhow::anyhow!("Server error: {e}")))?;

    Ok(())
}
