use tracing::info;

use crate::Result;
use crate::config::Config;
use crate::database::Database;
use crate::ingest::sample_documents;
use crate::server;

/// Start the HTTP server.
pub async fn serve(config: Config) -> Result<()> {
    server::serve(config).await
}

/// Ensure the database schema exists. `Database::new` runs migrations, so
/// this is a connect-and-report.
pub async fn init_db(config: &Config) -> Result<()> {
    let database = Database::new(&config.database.url).await?;
    let articles = database.count_articles().await?;
    info!("Database ready at {} ({} articles)", config.database.url, articles);
    Ok(())
}

/// Run the ingestion pipeline once over the sample document set.
pub async fn ingest(config: &Config) -> Result<()> {
    let state = server::build_state(config).await?;
    let report = state
        .ingest
        .run(sample_documents(config.ingest.sample_count))
        .await?;
    info!(
        "Ingested {} articles in {} batches",
        report.articles, report.batches
    );
    Ok(())
}
