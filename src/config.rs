use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::chunk::MIN_DOCUMENT_CHARS;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Chunk window policy. `target_chars` and `overlap_chars` are character
/// counts; there is no production default for them, they must be set per
/// deployment.
#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    pub target_chars: usize,
    #[serde(default)]
    pub overlap_chars: usize,
    #[serde(default = "default_min_document_chars")]
    pub min_document_chars: usize,
}

fn default_min_document_chars() -> usize {
    MIN_DOCUMENT_CHARS
}

/// Retrieval policy. `min_similarity` is the relevance floor applied to
/// every candidate; it has no production default and must be chosen per
/// deployment.
#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    pub min_similarity: f32,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContextConfig {
    /// Overall character budget for the assembled context text. Truncation
    /// drops whole chunks from the tail, never mid-chunk.
    #[serde(default = "default_char_budget")]
    pub char_budget: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            char_budget: default_char_budget(),
        }
    }
}

fn default_char_budget() -> usize {
    16_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            dims: None,
            batch_size: 64,
            max_retries: 5,
            timeout_secs: 30,
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

/// Windows for the improvement metric: the most recent `recent_window`
/// interactions are compared against the `baseline_window` interactions
/// before them.
#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default = "default_window")]
    pub recent_window: usize,
    #[serde(default = "default_window")]
    pub baseline_window: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            recent_window: default_window(),
            baseline_window: default_window(),
        }
    }
}

fn default_window() -> usize {
    10
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate chunking
    if config.chunking.target_chars == 0 {
        anyhow::bail!("chunking.target_chars must be > 0");
    }
    if config.chunking.overlap_chars >= config.chunking.target_chars {
        anyhow::bail!("chunking.overlap_chars must be smaller than chunking.target_chars");
    }

    // Validate retrieval
    if config.retrieval.max_results < 1 {
        anyhow::bail!("retrieval.max_results must be >= 1");
    }
    if !(-1.0..=1.0).contains(&config.retrieval.min_similarity) {
        anyhow::bail!("retrieval.min_similarity must be in [-1.0, 1.0]");
    }

    if config.context.char_budget == 0 {
        anyhow::bail!("context.char_budget must be > 0");
    }

    // Validate embedding
    if config.embedding.is_enabled() {
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    match config.embedding.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(body: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gw.toml");
        std::fs::write(&path, body).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_minimal_config() {
        let (_dir, path) = write_config(
            r#"
[db]
path = "data/gw.sqlite"

[chunking]
target_chars = 800
overlap_chars = 200

[retrieval]
min_similarity = 0.35
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.chunking.target_chars, 800);
        assert_eq!(cfg.chunking.min_document_chars, MIN_DOCUMENT_CHARS);
        assert_eq!(cfg.retrieval.max_results, 5);
        assert!(!cfg.embedding.is_enabled());
        assert_eq!(cfg.context.char_budget, 16_000);
    }

    #[test]
    fn test_overlap_must_be_smaller() {
        let (_dir, path) = write_config(
            r#"
[db]
path = "data/gw.sqlite"

[chunking]
target_chars = 200
overlap_chars = 200

[retrieval]
min_similarity = 0.35
"#,
        );
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_enabled_embedding_requires_model_and_dims() {
        let (_dir, path) = write_config(
            r#"
[db]
path = "data/gw.sqlite"

[chunking]
target_chars = 800

[retrieval]
min_similarity = 0.35

[embedding]
provider = "openai"
"#,
        );
        assert!(load_config(&path).is_err());
    }
}
