//! Desk configuration

use deskroute_classifiers::{ClassifierSettings, DEFAULT_THRESHOLD};
use deskroute_core::{Error, Result};
use deskroute_retrieval::{EmbedderConfig, DEFAULT_TOP_K};
use deskroute_telemetry::JournalConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level desk configuration, read from `deskroute.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskConfig {
    /// Keyword rule table used for training
    #[serde(default = "default_rules_path")]
    pub rules_path: PathBuf,

    /// Trained classifier artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Directory of `.txt` knowledge-base articles
    #[serde(default = "default_knowledge_base_dir")]
    pub knowledge_base_dir: PathBuf,

    #[serde(default)]
    pub escalation: EscalationConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub training: ClassifierSettings,

    #[serde(default)]
    pub journal: JournalConfig,
}

/// Escalation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Confidence below which a request goes to an operator
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Answers returned per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub embedder: EmbedderConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            embedder: EmbedderConfig::default(),
        }
    }
}

fn default_rules_path() -> PathBuf {
    PathBuf::from("data/rules/rules.json")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/lightweight_clf.json")
}

fn default_knowledge_base_dir() -> PathBuf {
    PathBuf::from("data/knowledge_base")
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// Values given on the command line; each one replaces the file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub rules_path: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub knowledge_base_dir: Option<PathBuf>,
    pub threshold: Option<f32>,
    pub top_k: Option<usize>,
}

impl DeskConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: impl AsRef<Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let config_path = config_path.as_ref();

        // Try to load from file, or use defaults
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path).map_err(|e| {
                Error::config(format!("failed to read {}: {}", config_path.display(), e))
            })?;
            Self::from_yaml(&content)?
        } else {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            Self::default()
        };

        // Apply CLI overrides
        if let Some(path) = &overrides.rules_path {
            config.rules_path = path.clone();
        }
        if let Some(path) = &overrides.model_path {
            config.model_path = path.clone();
        }
        if let Some(dir) = &overrides.knowledge_base_dir {
            config.knowledge_base_dir = dir.clone();
        }
        if let Some(threshold) = overrides.threshold {
            config.escalation.threshold = threshold;
        }
        if let Some(top_k) = overrides.top_k {
            config.retrieval.top_k = top_k;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse YAML; missing fields take their defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::config(format!("invalid config: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.escalation.threshold.is_finite() {
            return Err(Error::config(format!(
                "escalation threshold must be a finite number, got {}",
                self.escalation.threshold
            )));
        }
        self.training
            .validate()
            .map_err(|e| Error::config(format!("invalid training settings: {}", e)))
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            rules_path: default_rules_path(),
            model_path: default_model_path(),
            knowledge_base_dir: default_knowledge_base_dir(),
            escalation: EscalationConfig::default(),
            retrieval: RetrievalConfig::default(),
            training: ClassifierSettings::default(),
            journal: JournalConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = DeskConfig::from_yaml("{}").unwrap();
        assert_eq!(config, DeskConfig::default());
        assert_eq!(config.escalation.threshold, 0.6);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.model_path, PathBuf::from("models/lightweight_clf.json"));
        assert_eq!(config.journal.dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_partial_yaml() {
        let config = DeskConfig::from_yaml(
            "escalation:\n  threshold: 0.7\nretrieval:\n  embedder:\n    type: hashing\n    dimension: 64\n",
        )
        .unwrap();
        assert_eq!(config.escalation.threshold, 0.7);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.embedder, EmbedderConfig::Hashing { dimension: 64 });
    }

    #[test]
    fn test_missing_file_uses_defaults_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = ConfigOverrides {
            threshold: Some(0.5),
            top_k: Some(5),
            ..Default::default()
        };
        let config = DeskConfig::load(dir.path().join("deskroute.yaml"), &overrides).unwrap();
        assert_eq!(config.escalation.threshold, 0.5);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.rules_path, PathBuf::from("data/rules/rules.json"));
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let overrides = ConfigOverrides {
            threshold: Some(f32::NAN),
            ..Default::default()
        };
        assert!(DeskConfig::load("/nonexistent/deskroute.yaml", &overrides)
            .unwrap_err()
            .is_config());
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        assert!(DeskConfig::from_yaml("escalation: [1, 2]").unwrap_err().is_config());
    }
}
