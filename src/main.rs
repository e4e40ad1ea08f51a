use clap::{Parser, Subcommand};
use news_rag::Result;
use news_rag::commands::{ingest, init_db, serve};
use news_rag::config::Config;

#[derive(Parser)]
#[command(name = "news-rag")]
#[command(about = "Retrieval-augmented chat service over a news corpus")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Ingest the sample document set into the relational store and vector index
    Ingest,
    /// Ensure the database schema exists
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Populate the environment from .env before reading configuration.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await?;
        }
        Commands::Ingest => {
            ingest(&config).await?;
        }
        Commands::InitDb => {
            init_db(&config).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["news-rag", "serve"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Serve { .. });
        }
    }

    #[test]
    fn serve_with_port_override() {
        let cli = Cli::try_parse_from(["news-rag", "serve", "--port", "8080"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Serve { port } = parsed.command {
                assert_eq!(port, Some(8080));
            }
        }
    }

    #[test]
    fn ingest_command() {
        let cli = Cli::try_parse_from(["news-rag", "ingest"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Ingest);
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["news-rag", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }
}
