//! Training settings for the text classifier

use deskroute_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Hyperparameters of the tf-idf + naive Bayes pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Additive (Lidstone) smoothing for naive Bayes
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Vocabulary size cap, most frequent terms first
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Smallest and largest n-gram length
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
}

fn default_alpha() -> f64 {
    0.1
}

fn default_max_features() -> usize {
    500
}

fn default_ngram_range() -> (usize, usize) {
    (1, 2)
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            max_features: default_max_features(),
            ngram_range: default_ngram_range(),
        }
    }
}

impl ClassifierSettings {
    /// Set smoothing
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set vocabulary cap
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set n-gram range
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.ngram_range = (min_n, max_n);
        self
    }

    /// Reject settings the pipeline cannot be trained with
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(Error::classifier(format!(
                "alpha must be a positive number, got {}",
                self.alpha
            )));
        }
        if self.max_features == 0 {
            return Err(Error::classifier("max_features must be at least 1"));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::classifier(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let settings: ClassifierSettings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings, ClassifierSettings::default());
        assert_eq!(settings.alpha, 0.1);
        assert_eq!(settings.max_features, 500);
        assert_eq!(settings.ngram_range, (1, 2));
    }

    #[test]
    fn test_validate() {
        assert!(ClassifierSettings::default().validate().is_ok());
        assert!(ClassifierSettings::default().with_alpha(0.0).validate().is_err());
        assert!(ClassifierSettings::default().with_alpha(f64::NAN).validate().is_err());
        assert!(ClassifierSettings::default().with_max_features(0).validate().is_err());
        assert!(ClassifierSettings::default().with_ngram_range(2, 1).validate().is_err());
        assert!(ClassifierSettings::default().with_ngram_range(0, 1).validate().is_err());
    }
}
