//! Core types for deskroute

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A support request text paired with its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledText {
    /// Request text
    pub text: String,

    /// Category label
    pub category: String,
}

impl LabeledText {
    /// Create a new labeled sample
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }
}

/// One dataset line as written by the data preparation tooling.
///
/// `text_clean` wins over `text` when both are present.
#[derive(Debug, Deserialize)]
struct DatasetRecord {
    #[serde(default)]
    text_clean: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

/// Parse a JSON Lines dataset. Blank lines are ignored.
pub fn parse_dataset(content: &str) -> Result<Vec<LabeledText>> {
    let mut samples = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: DatasetRecord = serde_json::from_str(line).map_err(|e| {
            Error::config(format!("dataset line {}: invalid record: {}", idx + 1, e))
        })?;

        let text = record.text_clean.or(record.text).ok_or_else(|| {
            Error::config(format!(
                "dataset line {}: record has neither 'text_clean' nor 'text'",
                idx + 1
            ))
        })?;

        let category = record.category.ok_or_else(|| {
            Error::config(format!("dataset line {}: record has no 'category'", idx + 1))
        })?;

        samples.push(LabeledText { text, category });
    }

    Ok(samples)
}

/// Load a JSON Lines dataset from disk
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<LabeledText>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::config(format!(
            "dataset file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    parse_dataset(&content)
}
