//! Append-only query and feedback journal
//!
//! Three JSON Lines files live in the journal directory:
//! - `queries.jsonl`: every routed query with its decision
//! - `feedback.jsonl`: user ratings of automatic answers
//! - `learned_queries.jsonl`: positively rated queries in the training
//!   dataset format, collected for offline retraining

use chrono::{DateTime, Utc};
use deskroute_core::{LabeledText, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const QUERIES_FILE: &str = "queries.jsonl";
pub const FEEDBACK_FILE: &str = "feedback.jsonl";
pub const LEARNED_FILE: &str = "learned_queries.jsonl";

/// Journal location and switch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalConfig {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_enabled() -> bool {
    true
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            enabled: default_enabled(),
        }
    }
}

/// A routed query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub category: String,
    pub confidence: f32,
    pub escalated: bool,
}

/// A user's rating of an automatic answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub category: String,
    pub confidence: f32,
    pub useful: bool,
}

fn generate_record_id() -> String {
    format!("rec_{}", uuid::Uuid::new_v4())
}

/// File-backed journal. A disabled journal accepts writes and drops them.
#[derive(Debug, Clone)]
pub struct QueryJournal {
    config: JournalConfig,
}

impl QueryJournal {
    /// Open the journal, creating its directory when enabled
    pub fn open(config: JournalConfig) -> Result<Self> {
        if config.enabled {
            std::fs::create_dir_all(&config.dir)?;
        }
        Ok(Self { config })
    }

    /// Journal rooted at `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::open(JournalConfig {
            dir: dir.into(),
            enabled: true,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    /// Append a routed query
    pub fn record_query(
        &self,
        query: &str,
        category: &str,
        confidence: f32,
        escalated: bool,
    ) -> Result<QueryRecord> {
        let record = QueryRecord {
            id: generate_record_id(),
            timestamp: Utc::now(),
            query: query.to_string(),
            category: category.to_string(),
            confidence,
            escalated,
        };
        self.append(QUERIES_FILE, &record)?;
        Ok(record)
    }

    /// Append a rating; a useful answer also lands in the learned queries
    pub fn record_feedback(
        &self,
        query: &str,
        category: &str,
        confidence: f32,
        useful: bool,
    ) -> Result<FeedbackRecord> {
        let record = FeedbackRecord {
            id: generate_record_id(),
            timestamp: Utc::now(),
            query: query.to_string(),
            category: category.to_string(),
            confidence,
            useful,
        };
        self.append(FEEDBACK_FILE, &record)?;

        if useful {
            self.append(LEARNED_FILE, &LabeledText::new(query, category))?;
        }
        Ok(record)
    }

    pub fn read_queries(&self) -> Result<Vec<QueryRecord>> {
        self.read(QUERIES_FILE)
    }

    pub fn read_feedback(&self) -> Result<Vec<FeedbackRecord>> {
        self.read(FEEDBACK_FILE)
    }

    /// Learned queries, readable as a training dataset
    pub fn read_learned(&self) -> Result<Vec<LabeledText>> {
        self.read(LEARNED_FILE)
    }

    /// Number of rated requests per category
    pub fn category_counts(&self) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for record in self.read_feedback()? {
            *counts.entry(record.category).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn append<T: Serialize>(&self, file: &str, record: &T) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let path = self.config.dir.join(file);
        let handle = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(handle);
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        debug!("Appended record to {}", path.display());
        Ok(())
    }

    /// Missing files read as empty; malformed lines are skipped
    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.config.dir.join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(std::fs::File::open(&path)?);
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping malformed line {} in {}: {}", idx + 1, path.display(), e),
            }
        }
        Ok(records)
    }
}
