//! `deskroute train`

use anyhow::Context;
use deskroute_classifiers::{RuleTable, TextClassifier};
use deskroute_core::load_dataset;
use deskroute_router::DeskConfig;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a training run produced
#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub samples: usize,
    pub categories: Vec<String>,
    pub vocabulary_size: usize,
    pub model_path: PathBuf,
}

/// Train on `data` with the rules and settings from `config`, then save the
/// artifact to `config.model_path`
pub fn run(
    config: &DeskConfig,
    data: &Path,
    alpha: Option<f64>,
    max_features: Option<usize>,
) -> anyhow::Result<TrainSummary> {
    let samples = load_dataset(data)
        .with_context(|| format!("failed to load dataset {}", data.display()))?;
    info!("Loaded {} samples from {}", samples.len(), data.display());

    let rules = RuleTable::from_file(&config.rules_path)?;

    let mut settings = config.training.clone();
    if let Some(alpha) = alpha {
        settings = settings.with_alpha(alpha);
    }
    if let Some(max_features) = max_features {
        settings = settings.with_max_features(max_features);
    }

    let classifier = TextClassifier::train_samples(&samples, rules, &settings)?;
    classifier
        .save(&config.model_path)
        .with_context(|| format!("failed to save model to {}", config.model_path.display()))?;

    Ok(TrainSummary {
        samples: samples.len(),
        categories: classifier.categories().to_vec(),
        vocabulary_size: classifier
            .pipeline()
            .vectorizer()
            .map_or(0, |v| v.n_features()),
        model_path: config.model_path.clone(),
    })
}

pub fn print(summary: &TrainSummary) {
    println!("Trained on {} samples", summary.samples);
    println!("Vocabulary: {} terms", summary.vocabulary_size);
    println!("Categories: {}", summary.categories.join(", "));
    println!("Model saved to {}", summary.model_path.display());
}
