//! Embedder configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default sentence-embedding model on the Hugging Face Hub
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2";

/// Which embedder backs the retriever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EmbedderConfig {
    /// BERT sentence encoder run with Candle
    SentenceTransformer(SentenceModelConfig),

    /// Deterministic feature-hashing embedder, no model files needed
    Hashing {
        #[serde(default = "default_hashing_dimension")]
        dimension: usize,
    },
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self::SentenceTransformer(SentenceModelConfig::default())
    }
}

/// Where to find the sentence encoder and how to run it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceModelConfig {
    /// Hugging Face repository id
    #[serde(default = "default_repo")]
    pub repo: String,

    #[serde(default = "default_revision")]
    pub revision: String,

    /// Local model directory; takes precedence over `repo`
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// `cpu`, `cuda` or `metal`
    #[serde(default = "default_device")]
    pub device: String,

    /// Token limit per input, longer inputs are truncated
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

impl Default for SentenceModelConfig {
    fn default() -> Self {
        Self {
            repo: default_repo(),
            revision: default_revision(),
            path: None,
            device: default_device(),
            max_length: default_max_length(),
        }
    }
}

impl SentenceModelConfig {
    /// Load from a local directory instead of the Hub
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Set device
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Set token limit
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }
}

fn default_repo() -> String {
    DEFAULT_MODEL_REPO.to_string()
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_max_length() -> usize {
    128
}

fn default_hashing_dimension() -> usize {
    384
}
