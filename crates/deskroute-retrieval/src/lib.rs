//! deskroute Retrieval
//!
//! Semantic search over a knowledge base of plain-text articles.
//!
//! The corpus is read and embedded once by [`SemanticRetriever::load`];
//! queries are embedded with the same [`Embedder`] and ranked by cosine
//! similarity. Two embedders ship with the crate:
//! - [`SentenceEmbedder`]: BERT sentence encoder run with Candle, loaded from
//!   a local directory or the Hugging Face Hub
//! - [`HashingEmbedder`]: deterministic feature hashing for offline use

pub mod config;
pub mod corpus;
pub mod embedder;
pub mod model_loader;
pub mod pool;
pub mod retriever;

pub use config::{EmbedderConfig, SentenceModelConfig, DEFAULT_MODEL_REPO};
pub use corpus::{Corpus, Document};
pub use embedder::{from_config, Embedder, HashingEmbedder};
pub use model_loader::{get_device, ModelFiles, SentenceEmbedder};
pub use retriever::{RetrievalOutcome, RetrievedDocument, SemanticRetriever, DEFAULT_TOP_K};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::embedder::{Embedder, HashingEmbedder};
    pub use crate::retriever::{RetrievalOutcome, RetrievedDocument, SemanticRetriever};
}
