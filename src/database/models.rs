use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Article metadata, owned by the relational store. Immutable after insert;
/// `id` is the join key to the vector index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
}

/// Append-only record of a query/answer pair. Authoritative history of
/// record: must survive even when the session context cache does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InteractionLogEntry {
    #[serde(skip_serializing, default)]
    pub id: i64,
    pub session_id: String,
    pub user_query: String,
    pub llm_response: String,
    pub response_time_ms: i64,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInteraction {
    pub session_id: String,
    pub user_query: String,
    pub llm_response: String,
    pub response_time_ms: i64,
}
