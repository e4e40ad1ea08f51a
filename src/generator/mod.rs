
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::GenerationConfig;

const NO_CONTEXT_PLACEHOLDER: &str = "No context provided.";

/// Deterministic template answer used when no generation backend is
/// configured or the backend call fails. Pure: identical inputs always
/// yield identical output.
pub fn template_answer(context: &str, query: &str) -> String {
    let cited: Vec<&str> = context
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(3)
        .collect();

    let summary = if cited.is_empty() {
        NO_CONTEXT_PLACEHOLDER.to_string()
    } else {
        cited.join("; ")
    };

    format!(
        "Based on the provided context: {summary}\n\n\
         Answering your question \"{query}\": The information above is relevant to your query. \
         Please refer to the news articles for detailed information."
    )
}

/// External text-generation backend: one prompt in, one text response out.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send generation request")?
            .error_for_status()
            .context("Generation request rejected")?
            .json::<GenerateResponse>()
            .await
            .context("Failed to parse generation response")?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| anyhow!("Generation response contained no candidates"))
    }
}

/// Produces the final answer from a composed context and query. Holds an
/// optional backend; any non-success outcome (unconfigured or failed call)
/// collapses into the single template fallback path.
#[derive(Clone)]
pub struct AnswerGenerator {
    backend: Option<Arc<dyn GenerationBackend>>,
}

impl AnswerGenerator {
    pub fn new(config: &GenerationConfig) -> Self {
        let backend: Option<Arc<dyn GenerationBackend>> = match &config.api_key {
            Some(key) => Some(Arc::new(GeminiClient::new(
                &config.api_url,
                key.clone(),
                config.model.clone(),
            ))),
            None => {
                info!("No generation API key configured; using template fallback answers");
                None
            }
        };
        Self { backend }
    }

    pub fn with_backend(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn template_only() -> Self {
        Self { backend: None }
    }

    fn build_prompt(context: &str, query: &str) -> String {
        format!(
            "You are a news assistant.\n\nContext:\n{context}\n\nQuestion:\n{query}\n\n\
             Answer clearly based ONLY on the context above."
        )
    }

    /// Never fails: backend errors degrade to the template fallback so that
    /// callers see one answer format regardless of why the backend was
    /// unavailable.
    pub async fn answer(&self, context: &str, query: &str) -> String {
        let Some(backend) = &self.backend else {
            debug!("Generation backend not configured, using template answer");
            return template_answer(context, query);
        };

        let prompt = Self::build_prompt(context, query);
        match backend.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Generation backend failed, using template answer: {}", e);
                template_answer(context, query)
            }
        }
    }
}
