//! Knowledge-base loading

use deskroute_core::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One knowledge-base article
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Source file
    pub path: PathBuf,

    /// Trimmed, non-empty content
    pub text: String,
}

/// Ordered, non-empty set of documents read from a directory of `.txt` files
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Read every `*.txt` file in `dir`, sorted by file name.
    ///
    /// Empty, unreadable or non-UTF-8 files are skipped with a warning.
    /// A missing directory, a directory without `.txt` files, or one where
    /// every file was skipped is a configuration error.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::config(format!(
                "knowledge base directory not found: {}",
                dir.display()
            )));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| {
                Error::config(format!(
                    "failed to read knowledge base directory {}: {}",
                    dir.display(),
                    e
                ))
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        if paths.is_empty() {
            return Err(Error::config(format!(
                "no .txt files in knowledge base directory {}",
                dir.display()
            )));
        }

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    let text = content.trim();
                    if text.is_empty() {
                        warn!("Skipping empty document {}", path.display());
                    } else {
                        documents.push(Document {
                            text: text.to_string(),
                            path,
                        });
                    }
                }
                Err(e) => warn!("Skipping unreadable document {}: {}", path.display(), e),
            }
        }

        if documents.is_empty() {
            return Err(Error::config(format!(
                "every document in {} is empty or unreadable",
                dir.display()
            )));
        }

        info!("Loaded {} documents from {}", documents.len(), dir.display());
        Ok(Self { documents })
    }

    /// Build from in-memory texts; blank entries are dropped
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let documents = texts
            .into_iter()
            .map(Into::into)
            .filter(|t| !t.trim().is_empty())
            .enumerate()
            .map(|(idx, text)| Document {
                path: PathBuf::from(format!("doc-{}", idx)),
                text: text.trim().to_string(),
            })
            .collect();
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
