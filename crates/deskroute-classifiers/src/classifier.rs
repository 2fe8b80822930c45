//! Classifier trait, classification result and the trained category model

use crate::config::ClassifierSettings;
use crate::naive_bayes::argmax;
use crate::pipeline::TextPipeline;
use crate::rules::{RuleTable, RuleTagger};
use chrono::{DateTime, Utc};
use deskroute_core::{Error, LabeledText, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Artifact format written by [`TextClassifier::save`]
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Trait for all classifiers
pub trait Classifier: Send + Sync {
    /// Classify the given text
    fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Result of classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Predicted category
    pub label: String,

    /// Posterior of the predicted category (0.0-1.0)
    pub score: f32,

    /// Additional metadata
    #[serde(default)]
    pub metadata: ClassificationMetadata,

    /// Latency in microseconds
    #[serde(default)]
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
            metadata: ClassificationMetadata::default(),
            latency_us: 0,
        }
    }

    /// Check if score reaches threshold
    pub fn exceeds_threshold(&self, threshold: f32) -> bool {
        self.score >= threshold
    }
}

/// Metadata about classification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetadata {
    /// Model name
    pub model: Option<String>,

    /// Posterior of every class, in class order
    pub all_scores: Option<Vec<(String, f32)>>,

    /// Rule categories matched in the raw text
    pub rule_tags: Vec<String>,

    /// Additional key-value pairs
    pub extra: Vec<(String, String)>,
}

/// On-disk form of a trained classifier
#[derive(Debug, Serialize, Deserialize)]
struct ModelArtifact {
    format_version: u32,
    name: String,
    trained_at: DateTime<Utc>,
    settings: ClassifierSettings,
    pipeline: TextPipeline,
}

/// Rule-augmented tf-idf + naive Bayes category classifier.
///
/// Closed-world: predictions are always one of the training labels.
#[derive(Debug, Clone)]
pub struct TextClassifier {
    name: String,
    settings: ClassifierSettings,
    trained_at: DateTime<Utc>,
    pipeline: TextPipeline,
}

impl TextClassifier {
    /// Fit the standard pipeline on parallel texts and labels
    pub fn train(
        texts: &[String],
        labels: &[String],
        rules: RuleTable,
        settings: &ClassifierSettings,
    ) -> Result<Self> {
        if texts.is_empty() {
            return Err(Error::classifier("training set is empty"));
        }
        if texts.len() != labels.len() {
            return Err(Error::classifier(format!(
                "got {} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }
        if let Some(pos) = labels.iter().position(|l| l.trim().is_empty()) {
            return Err(Error::classifier(format!("blank label at sample {}", pos + 1)));
        }

        let mut pipeline = TextPipeline::standard(RuleTagger::new(rules)?, settings)?;
        pipeline.fit(texts, labels)?;

        let classifier = Self {
            name: "lightweight_clf".to_string(),
            settings: settings.clone(),
            trained_at: Utc::now(),
            pipeline,
        };
        info!(
            "Trained classifier on {} samples, categories: {:?}",
            texts.len(),
            classifier.categories()
        );
        Ok(classifier)
    }

    /// Fit from labeled samples
    pub fn train_samples(
        samples: &[LabeledText],
        rules: RuleTable,
        settings: &ClassifierSettings,
    ) -> Result<Self> {
        let (texts, labels): (Vec<String>, Vec<String>) = samples
            .iter()
            .map(|s| (s.text.clone(), s.category.clone()))
            .unzip();
        Self::train(&texts, &labels, rules, settings)
    }

    /// Set the model name reported in results and artifacts
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Most probable category and its posterior
    pub fn predict(&self, text: &str) -> Result<ClassificationResult> {
        self.predict_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| Error::internal("pipeline returned no prediction"))
    }

    /// Predict every text in one pass through the pipeline
    pub fn predict_batch(&self, texts: &[String]) -> Result<Vec<ClassificationResult>> {
        let start = Instant::now();
        let classes = self.categories();
        let posteriors = self.pipeline.predict_proba(texts)?;
        let per_item_us = start.elapsed().as_micros() as u64 / texts.len().max(1) as u64;

        texts
            .iter()
            .zip(posteriors)
            .map(|(text, probs)| {
                let (best, prob) = argmax(&probs)
                    .ok_or_else(|| Error::classifier("classifier has no classes"))?;
                let label = classes
                    .get(best)
                    .ok_or_else(|| Error::internal("posterior column without a class"))?;

                let rule_tags = self
                    .pipeline
                    .tagger()
                    .map(|t| t.matched_categories(text).into_iter().map(str::to_string).collect())
                    .unwrap_or_default();

                let mut result = ClassificationResult::new(label.clone(), prob as f32);
                result.metadata.model = Some(self.name.clone());
                result.metadata.all_scores = Some(
                    classes
                        .iter()
                        .cloned()
                        .zip(probs.iter().map(|&p| p as f32))
                        .collect(),
                );
                result.metadata.rule_tags = rule_tags;
                result.latency_us = per_item_us;

                debug!("Classified as '{}' ({:.3})", result.label, result.score);
                Ok(result)
            })
            .collect()
    }

    /// Category set, sorted
    pub fn categories(&self) -> &[String] {
        self.pipeline.classes().unwrap_or(&[])
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn pipeline(&self) -> &TextPipeline {
        &self.pipeline
    }

    /// Write the fitted pipeline as a JSON artifact, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let artifact = ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            name: self.name.clone(),
            trained_at: self.trained_at,
            settings: self.settings.clone(),
            pipeline: self.pipeline.clone(),
        };
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), &artifact)?;

        info!("Saved classifier artifact to {}", path.display());
        Ok(())
    }

    /// Load an artifact written by [`save`](Self::save)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::config(format!(
                "model artifact not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read model artifact {}: {}", path.display(), e))
        })?;
        let classifier = Self::from_json(&content)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;

        info!(
            "Loaded classifier '{}' from {} ({} categories)",
            classifier.name,
            path.display(),
            classifier.categories().len()
        );
        Ok(classifier)
    }

    /// Parse an artifact from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("corrupt model artifact: {}", e)))?;

        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(Error::config(format!(
                "unsupported model artifact version {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        if artifact.pipeline.classes().map_or(true, |c| c.is_empty()) {
            return Err(Error::config("model artifact contains no fitted classifier"));
        }
        artifact
            .pipeline
            .check_fitted()
            .map_err(|e| Error::config(format!("inconsistent model artifact: {}", e)))?;

        Ok(Self {
            name: artifact.name,
            settings: artifact.settings,
            trained_at: artifact.trained_at,
            pipeline: artifact.pipeline,
        })
    }
}

impl Classifier for TextClassifier {
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.predict(text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
