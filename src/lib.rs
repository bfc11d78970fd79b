//! Retrieval-augmented exception summaries.
//!
//! Three independent operations over a CSV knowledge base of exception
//! records: offline ingestion + indexing into a SQLite vector index, a
//! query pipeline (embed, retrieve top-1, prompt, generate), and a thin
//! HTTP façade over that pipeline.

pub mod config;
pub mod errors;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod server;
pub mod state;
pub mod store;
