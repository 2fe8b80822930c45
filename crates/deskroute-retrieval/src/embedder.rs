//! Text embedders

use crate::config::EmbedderConfig;
use crate::model_loader::SentenceEmbedder;
use crate::pool::l2_normalize;
use deskroute_core::{Error, Result};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use twox_hash::XxHash64;

/// Maps text to a fixed-dimension vector.
///
/// Implementations must be deterministic: the same text always yields the
/// same vector, so documents and queries are comparable.
pub trait Embedder: Send + Sync {
    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, in order
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Output vector length
    fn dimension(&self) -> usize;

    /// Embedder name for logs
    fn name(&self) -> &str;
}

/// Build the embedder described by `config`
pub fn from_config(config: &EmbedderConfig) -> Result<Arc<dyn Embedder>> {
    match config {
        EmbedderConfig::SentenceTransformer(model) => Ok(Arc::new(SentenceEmbedder::load(model)?)),
        EmbedderConfig::Hashing { dimension } => Ok(Arc::new(HashingEmbedder::new(*dimension)?)),
    }
}

/// Feature-hashing embedder over lowercase whitespace tokens.
///
/// Texts that share words land close together; there is no notion of
/// synonymy. Useful offline and in tests.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::config("hashing embedder dimension must be at least 1"));
        }
        Ok(Self { dimension })
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0f32; self.dimension];
        for token in text.split_whitespace() {
            let token: String = token
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect();
            if token.is_empty() {
                continue;
            }

            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dimension as u64) as usize;
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        l2_normalize(&mut v);
        Ok(v)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::dot;

    #[test]
    fn test_hashing_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(64).unwrap();
        let a = embedder.embed("Как сбросить пароль?").unwrap();
        let b = embedder.embed("Как сбросить пароль?").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!((dot(&a, &a) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hashing_ignores_case_and_punctuation() {
        let embedder = HashingEmbedder::new(128).unwrap();
        assert_eq!(
            embedder.embed("Пароль, VPN!").unwrap(),
            embedder.embed("пароль vpn").unwrap()
        );
    }

    #[test]
    fn test_hashing_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(8).unwrap();
        assert!(embedder.embed("  ").unwrap().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashingEmbedder::new(0).unwrap_err().is_config());
    }

    #[test]
    fn test_from_config_hashing() {
        let embedder = from_config(&EmbedderConfig::Hashing { dimension: 32 }).unwrap();
        assert_eq!(embedder.dimension(), 32);
        assert_eq!(embedder.name(), "hashing");
        assert_eq!(embedder.embed_batch(&["a b".to_string(), "c".to_string()]).unwrap().len(), 2);
    }
}
