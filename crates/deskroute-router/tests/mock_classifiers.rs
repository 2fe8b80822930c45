//! Mock classifiers for testing
//!
//! Provides configurable implementations of the Classifier trait for
//! testing routing decisions without a trained model.

#![allow(dead_code)]

use deskroute_classifiers::{ClassificationResult, Classifier};
use deskroute_core::{Error, Result};
use std::sync::atomic::{AtomicU32, Ordering};

/// A configurable mock classifier for testing
pub struct MockClassifier {
    name: String,
    score: f32,
    label: String,
    call_count: AtomicU32,
}

impl MockClassifier {
    /// Create a new mock classifier with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            score: 0.5,
            label: "access".to_string(),
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the score this classifier will return
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Set the label this classifier will return
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Get the number of times classify was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, _text: &str) -> Result<ClassificationResult> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Ok(ClassificationResult::new(self.label.clone(), self.score))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A classifier that always fails
pub struct FailingClassifier {
    name: String,
}

impl FailingClassifier {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Classifier for FailingClassifier {
    fn classify(&self, _text: &str) -> Result<ClassificationResult> {
        Err(Error::classifier("Simulated classifier failure"))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
