use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::debug;

use super::models::{Article, InteractionLogEntry, NewArticle, NewInteraction};

pub struct ArticleQueries;

impl ArticleQueries {
    pub async fn create(pool: &SqlitePool, new_article: NewArticle) -> Result<Article> {
        let id = sqlx::query("INSERT INTO articles (title, content) VALUES (?, ?)")
            .bind(&new_article.title)
            .bind(&new_article.content)
            .execute(pool)
            .await
            .context("Failed to insert article")?
            .last_insert_rowid();

        Self::get_by_id(pool, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created article"))
    }

    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Article>> {
        sqlx::query_as::<_, Article>(
            "SELECT id, title, content, created_at FROM articles WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get article by id")
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(pool)
            .await
            .context("Failed to count articles")
    }
}

pub struct InteractionQueries;

impl InteractionQueries {
    pub async fn append(pool: &SqlitePool, interaction: NewInteraction) -> Result<()> {
        sqlx::query(
            "INSERT INTO interactions (session_id, user_query, llm_response, response_time_ms) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&interaction.session_id)
        .bind(&interaction.user_query)
        .bind(&interaction.llm_response)
        .bind(interaction.response_time_ms)
        .execute(pool)
        .await
        .context("Failed to append interaction log entry")?;

        debug!(
            "Logged interaction for session {} ({}ms)",
            interaction.session_id, interaction.response_time_ms
        );
        Ok(())
    }

    pub async fn list_by_session(
        pool: &SqlitePool,
        session_id: &str,
    ) -> Result<Vec<InteractionLogEntry>> {
        sqlx::query_as::<_, InteractionLogEntry>(
            "SELECT id, session_id, user_query, llm_response, response_time_ms, timestamp \
             FROM interactions WHERE session_id = ? ORDER BY id",
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch interaction history")
    }

    pub async fn delete_by_session(pool: &SqlitePool, session_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM interactions WHERE session_id = ?")
            .bind(session_id)
            .execute(pool)
            .await
            .context("Failed to delete interaction history")?;

        Ok(result.rows_affected())
    }
}
