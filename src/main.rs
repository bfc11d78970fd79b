use std::path::PathBuf;

use anyhow::Context;
use axum::Router;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use exception_rag::index::build_index;
use exception_rag::server::router::router;
use exception_rag::state::AppState;
use exception_rag::{ingest, logging};

#[derive(Parser)]
#[command(name = "exception-rag", about = "Retrieval-augmented exception summaries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest the exception CSV and rebuild the vector index.
    Index {
        /// Path to the four-column exception CSV.
        #[arg(long)]
        csv: PathBuf,
    },
    /// Summarize one exception name and print the result.
    Query {
        /// Free-text exception name to look up.
        name: String,
    },
    /// Serve the summary endpoint over HTTP.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let state = AppState::initialize().await?;
    logging::init(&state.paths);

    match cli.command {
        Command::Index { csv } => {
            let documents = ingest::load_documents(&csv)?;
            let count = build_index(&state.store, &state.embedder, documents).await?;
            println!("indexed {} documents into {}", count, state.paths.index_db_path.display());
        }
        Command::Query { name } => {
            let summary = state.pipeline.summarize(&name).await?;
            println!("{}", summary);
        }
        Command::Serve => {
            let bind_addr = format!(
                "{}:{}",
                state.config.server.host, state.config.server.port
            );
            let listener = TcpListener::bind(&bind_addr)
                .await
                .with_context(|| format!("Failed to bind to {}", bind_addr))?;
            let addr = listener.local_addr()?;
            tracing::info!("Listening on {}", addr);

            let app: Router = router(state.clone());
            axum::serve(listener, app).await.context("Server error")?;
        }
    }

    Ok(())
}
