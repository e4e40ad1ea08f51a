
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// One prior conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextTurn {
    pub query: String,
    pub response: String,
}

/// Best-effort cache of recent conversation turns per session. Unavailability
/// must never fail a chat request, so the whole interface is infallible:
/// `get` yields empty on any miss or failure, `set` replaces the whole value
/// (no atomic append; the read-modify-write race between concurrent requests
/// for one session is accepted, last write wins).
#[async_trait]
pub trait SessionContextStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Vec<ContextTurn>;

    async fn set(&self, session_id: &str, turns: Vec<ContextTurn>);

    async fn clear(&self, session_id: &str);
}

/// In-process implementation. The trait is the seam for an external cache;
/// this one keeps single-node deployments dependency-free.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Vec<ContextTurn>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionContextStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Vec<ContextTurn> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn set(&self, session_id: &str, turns: Vec<ContextTurn>) {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), turns);
    }

    async fn clear(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }
}
