//! Nearest-neighbour retrieval over an embedded corpus

use crate::corpus::{Corpus, Document};
use crate::embedder::Embedder;
use crate::pool::{dot, l2_normalize};
use deskroute_core::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Default number of answers returned per query
pub const DEFAULT_TOP_K: usize = 3;

/// A ranked knowledge-base article
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedDocument {
    /// Position in the corpus
    pub index: usize,
    pub text: String,
    pub path: PathBuf,
    /// Cosine similarity to the query
    pub score: f32,
}

/// Outcome of a retrieval
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "documents", rename_all = "snake_case")]
pub enum RetrievalOutcome {
    /// Ranked documents, most similar first
    Answers(Vec<RetrievedDocument>),

    /// The knowledge base holds no documents
    KnowledgeBaseEmpty,
}

impl RetrievalOutcome {
    /// Ranked documents, empty for an empty knowledge base
    pub fn documents(&self) -> &[RetrievedDocument] {
        match self {
            Self::Answers(docs) => docs,
            Self::KnowledgeBaseEmpty => &[],
        }
    }

    pub fn is_knowledge_base_empty(&self) -> bool {
        matches!(self, Self::KnowledgeBaseEmpty)
    }
}

/// Corpus with one unit-length embedding per document, built once and
/// read-only afterwards
pub struct SemanticRetriever {
    corpus: Arc<Corpus>,
    embeddings: Arc<Vec<Vec<f32>>>,
    embedder: Arc<dyn Embedder>,
}

impl SemanticRetriever {
    /// Load a knowledge-base directory and embed every document
    pub fn load(source_dir: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let corpus = Corpus::load_dir(source_dir)?;
        Self::from_corpus(corpus, embedder)
    }

    /// Embed an already-loaded corpus
    pub fn from_corpus(corpus: Corpus, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let start = Instant::now();
        let texts: Vec<String> = corpus.documents().iter().map(|d| d.text.clone()).collect();
        let mut embeddings = embedder.embed_batch(&texts)?;

        if embeddings.len() != texts.len() {
            return Err(Error::embedding(format!(
                "embedder returned {} vectors for {} documents",
                embeddings.len(),
                texts.len()
            )));
        }
        for (doc, vector) in corpus.documents().iter().zip(embeddings.iter_mut()) {
            if vector.len() != embedder.dimension() {
                return Err(Error::embedding(format!(
                    "embedding of {} has dimension {}, expected {}",
                    doc.path.display(),
                    vector.len(),
                    embedder.dimension()
                )));
            }
            l2_normalize(vector);
        }

        info!(
            "Embedded {} documents with '{}' in {}ms",
            corpus.len(),
            embedder.name(),
            start.elapsed().as_millis()
        );

        Ok(Self {
            corpus: Arc::new(corpus),
            embeddings: Arc::new(embeddings),
            embedder,
        })
    }

    /// A retriever over no documents; every query yields
    /// [`RetrievalOutcome::KnowledgeBaseEmpty`]
    pub fn empty(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            corpus: Arc::new(Corpus::default()),
            embeddings: Arc::new(Vec::new()),
            embedder,
        }
    }

    /// The `top_k` most similar documents, most similar first.
    ///
    /// Ties keep corpus order. `top_k` beyond the corpus size returns the
    /// whole corpus; `top_k == 0` returns no answers.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievalOutcome> {
        if self.corpus.is_empty() {
            return Ok(RetrievalOutcome::KnowledgeBaseEmpty);
        }
        if top_k == 0 {
            return Ok(RetrievalOutcome::Answers(Vec::new()));
        }

        let mut query_vec = self.embedder.embed(query)?;
        if query_vec.len() != self.embedder.dimension() {
            return Err(Error::retrieval(format!(
                "query embedding has dimension {}, expected {}",
                query_vec.len(),
                self.embedder.dimension()
            )));
        }
        l2_normalize(&mut query_vec);

        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .map(|doc_vec| dot(&query_vec, doc_vec))
            .enumerate()
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(top_k);

        let answers: Vec<RetrievedDocument> = scored
            .into_iter()
            .filter_map(|(index, score)| {
                self.corpus.get(index).map(|doc: &Document| RetrievedDocument {
                    index,
                    text: doc.text.clone(),
                    path: doc.path.clone(),
                    score,
                })
            })
            .collect();

        debug!(
            "Retrieved {} documents, best score {:?}",
            answers.len(),
            answers.first().map(|d| d.score)
        );
        Ok(RetrievalOutcome::Answers(answers))
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }
}

impl Clone for SemanticRetriever {
    fn clone(&self) -> Self {
        Self {
            corpus: Arc::clone(&self.corpus),
            embeddings: Arc::clone(&self.embeddings),
            embedder: Arc::clone(&self.embedder),
        }
    }
}

impl std::fmt::Debug for SemanticRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticRetriever")
            .field("documents", &self.corpus.len())
            .field("embedder", &self.embedder.name())
            .finish()
    }
}
