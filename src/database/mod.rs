#[cfg(test)]
mod tests;

pub mod models;
pub mod queries;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

use crate::database::models::{Article, InteractionLogEntry, NewArticle, NewInteraction};
use crate::database::queries::{ArticleQueries, InteractionQueries};

pub type DbPool = Pool<Sqlite>;

#[derive(Debug, Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .context("Failed to create database connection pool")?;

        let database = Self { pool };
        database.run_migrations().await?;

        Ok(database)
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");

        sqlx::migrate!("src/database/migrations")
            .run(&self.pool)
            .await
            .context("Failed to run schema migration")?;

        debug!("Database migrations completed successfully");
        Ok(())
    }

    // Article operations
    pub async fn insert_article(&self, article: NewArticle) -> Result<Article> {
        ArticleQueries::create(&self.pool, article).await
    }

    pub async fn count_articles(&self) -> Result<i64> {
        ArticleQueries::count(&self.pool).await
    }

    // Interaction log operations
    pub async fn append_interaction(&self, interaction: NewInteraction) -> Result<()> {
        InteractionQueries::append(&self.pool, interaction).await
    }

    pub async fn get_history(&self, session_id: &str) -> Result<Vec<InteractionLogEntry>> {
        InteractionQueries::list_by_session(&self.pool, session_id).await
    }

    pub async fn delete_history(&self, session_id: &str) -> Result<u64> {
        InteractionQueries::delete_by_session(&self.pool, session_id).await
    }
}
