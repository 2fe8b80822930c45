//! Sentence encoder loading and inference with Candle

use crate::config::SentenceModelConfig;
use crate::embedder::Embedder;
use crate::pool::masked_mean_l2;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use deskroute_core::{Error, Result};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokenizers::{Tokenizer, TruncationDirection};
use tracing::{debug, info};

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Resolve a device name to a Candle device
pub fn get_device(name: &str) -> Result<Device> {
    match name {
        "cpu" => Ok(Device::Cpu),
        "cuda" => Device::new_cuda(0)
            .map_err(|e| Error::config(format!("Failed to initialize CUDA: {}", e))),
        "metal" | "mps" => Device::new_metal(0)
            .map_err(|e| Error::config(format!("Failed to initialize Metal: {}", e))),
        other => Err(Error::config(format!(
            "unknown device '{}', expected cpu, cuda or metal",
            other
        ))),
    }
}

/// Paths of the three files a sentence encoder needs
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Files inside a local model directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::config(format!(
                "model directory not found: {}",
                dir.display()
            )));
        }

        let files = Self {
            config: dir.join(CONFIG_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
            weights: dir.join(WEIGHTS_FILE),
        };
        for path in [&files.config, &files.tokenizer, &files.weights] {
            if !path.exists() {
                return Err(Error::config(format!("model file not found: {}", path.display())));
            }
        }
        Ok(files)
    }

    /// Files fetched from (or cached by) the Hugging Face Hub
    pub fn from_hub(repo_id: &str, revision: &str) -> Result<Self> {
        info!("Fetching sentence encoder {} @ {}", repo_id, revision);

        let api = Api::new()
            .map_err(|e| Error::embedding(format!("Failed to initialize HuggingFace API: {}", e)))?;
        let repo = api.repo(Repo::with_revision(
            repo_id.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));

        let get = |file: &str| {
            debug!("Resolving {}", file);
            repo.get(file)
                .map_err(|e| Error::embedding(format!("Failed to download {}: {}", file, e)))
        };

        Ok(Self {
            config: get(CONFIG_FILE)?,
            tokenizer: get(TOKENIZER_FILE)?,
            weights: get(WEIGHTS_FILE)?,
        })
    }
}

/// BERT sentence encoder with masked mean pooling and L2 normalization
pub struct SentenceEmbedder {
    name: String,
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
    max_length: usize,
}

impl SentenceEmbedder {
    /// Load from a local directory when `config.path` is set, else from the Hub
    pub fn load(config: &SentenceModelConfig) -> Result<Self> {
        let start = Instant::now();
        let (name, files) = match &config.path {
            Some(dir) => (dir.display().to_string(), ModelFiles::from_dir(dir)?),
            None => (
                config.repo.clone(),
                ModelFiles::from_hub(&config.repo, &config.revision)?,
            ),
        };
        let device = get_device(&config.device)?;

        let embedder = Self::from_files(name, &files, device, config.max_length)?;
        info!(
            "Loaded sentence encoder '{}' (dim {}) in {}ms",
            embedder.name,
            embedder.dimension,
            start.elapsed().as_millis()
        );
        Ok(embedder)
    }

    /// Build from already-resolved model files
    pub fn from_files(
        name: impl Into<String>,
        files: &ModelFiles,
        device: Device,
        max_length: usize,
    ) -> Result<Self> {
        if max_length == 0 {
            return Err(Error::config("max_length must be at least 1"));
        }

        let tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| Error::config(format!("Failed to load tokenizer: {}", e)))?;

        let config_json = std::fs::read_to_string(&files.config)
            .map_err(|e| Error::config(format!("Failed to read model config: {}", e)))?;
        let bert_config: BertConfig = serde_json::from_str(&config_json)
            .map_err(|e| Error::config(format!("Failed to parse model config: {}", e)))?;
        let dimension = serde_json::from_str::<serde_json::Value>(&config_json)
            .ok()
            .and_then(|v| v.get("hidden_size").and_then(|h| h.as_u64()))
            .ok_or_else(|| Error::config("model config has no hidden_size"))? as usize;

        // SAFETY: the weights file is not modified while mapped
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, &device)
                .map_err(|e| Error::config(format!("Failed to load weights: {}", e)))?
        };
        let model = BertModel::load(vb, &bert_config)
            .map_err(|e| Error::config(format!("Failed to load BERT model: {}", e)))?;

        Ok(Self {
            name: name.into(),
            model,
            tokenizer,
            device,
            dimension,
            max_length,
        })
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::embedding(format!("Tokenization failed: {}", e)))?;
        encoding.truncate(self.max_length, 0, TruncationDirection::Right);

        let tensors = (|| -> candle_core::Result<(Tensor, Tensor, Tensor)> {
            let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
            let type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
            let mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;
            Ok((input_ids, type_ids, mask))
        })();
        let (input_ids, type_ids, mask) =
            tensors.map_err(|e| Error::embedding(format!("Failed to create input tensors: {}", e)))?;

        let hidden = self
            .model
            .forward(&input_ids, &type_ids, Some(&mask))
            .map_err(|e| Error::embedding(format!("Model forward pass failed: {}", e)))?;

        masked_mean_l2(&hidden, &mask)?
            .squeeze(0)
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| Error::embedding(format!("Failed to read embedding: {}", e)))
    }
}

impl Embedder for SentenceEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.encode(text)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for SentenceEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEmbedder")
            .field("name", &self.name)
            .field("dimension", &self.dimension)
            .field("max_length", &self.max_length)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_device() {
        assert!(matches!(get_device("cpu").unwrap(), Device::Cpu));
        assert!(get_device("tpu").unwrap_err().is_config());
    }

    #[test]
    fn test_missing_model_dir_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelFiles::from_dir(&dir.path().join("absent")).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_incomplete_model_dir_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{}").unwrap();
        let err = ModelFiles::from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains(TOKENIZER_FILE));
    }

    #[test]
    fn test_load_from_local_dir_without_files_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = SentenceModelConfig::from_local(dir.path());
        assert!(SentenceEmbedder::load(&config).unwrap_err().is_config());
    }
}
