//! Application paths and configuration.
//!
//! Paths resolve from environment overrides first, then sensible defaults
//! under the project root. Configuration loads from `config.yml` when
//! present; every field has a serde default so a missing file still yields
//! a usable config.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    /// SQLite database holding the vector index.
    pub index_db_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let project_root = discover_project_root();
        let data_dir = discover_data_dir(&project_root);
        let log_dir = data_dir.join("logs");
        let index_db_path = data_dir.join("exception_index.db");

        for dir in [&data_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            project_root,
            data_dir,
            log_dir,
            index_db_path,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_project_root() -> PathBuf {
    if let Ok(root) = env::var("EXCEPTION_RAG_ROOT") {
        return PathBuf::from(root);
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if manifest_dir.join("config.yml").exists() {
        return manifest_dir;
    }

    env::current_dir().unwrap_or(manifest_dir)
}

fn discover_data_dir(project_root: &Path) -> PathBuf {
    if let Ok(dir) = env::var("EXCEPTION_RAG_DATA_DIR") {
        return PathBuf::from(dir);
    }

    project_root.join("db")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub retrieval: RetrievalConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key; the `GEMINI_API_KEY` environment variable takes precedence.
    pub api_key: Option<String>,
    pub embedding_model: String,
    pub generation_model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of nearest documents to retrieve.
    pub top_k: usize,
    /// Minimum cosine similarity for a match. `None` keeps the best-effort
    /// behavior of always returning the nearest record.
    pub score_threshold: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            gemini: GeminiConfig::default(),
            retrieval: RetrievalConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            embedding_model: "embedding-001".to_string(),
            generation_model: "gemini-pro".to_string(),
            temperature: 0.2,
            top_p: 0.50,
            request_timeout_secs: 30,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        RetrievalConfig {
            top_k: 1,
            score_threshold: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl AppConfig {
    /// Loads `config.yml` from the project root, falling back to defaults
    /// when the file is absent. Environment overrides are applied last.
    pub fn load(paths: &AppPaths) -> Result<Self, ApiError> {
        let config_path = paths.project_root.join("config.yml");
        let mut config = if config_path.exists() {
            let raw = fs::read_to_string(&config_path).map_err(ApiError::internal)?;
            serde_yaml::from_str(&raw)
                .map_err(|err| ApiError::Internal(format!("invalid config.yml: {}", err)))?
        } else {
            AppConfig::default()
        };

        if let Ok(key) = env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                config.gemini.api_key = Some(key);
            }
        }
        if let Some(port) = env::var("PORT").ok().and_then(|v| v.parse::<u16>().ok()) {
            config.server.port = port;
        }

        Ok(config)
    }

    pub fn require_api_key(&self) -> Result<String, ApiError> {
        self.gemini
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ApiError::BadRequest(
                    "no Gemini API key configured (set GEMINI_API_KEY or gemini.api_key)"
                        .to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_generation_params() {
        let config = AppConfig::default();
        assert_eq!(config.gemini.temperature, 0.2);
        assert_eq!(config.gemini.top_p, 0.50);
        assert_eq!(config.retrieval.top_k, 1);
        assert!(config.retrieval.score_threshold.is_none());
    }

    #[test]
    fn partial_yaml_fills_remaining_fields() {
        let raw = "retrieval:\n  top_k: 3\n  score_threshold: 0.4\n";
        let config: AppConfig = serde_yaml::from_str(raw).unwrap();
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.score_threshold, Some(0.4));
        assert_eq!(config.gemini.generation_model, "gemini-pro");
        assert_eq!(config.server.port, 8000);
    }
}
