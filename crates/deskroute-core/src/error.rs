//! Error types for deskroute

/// Result type alias using deskroute's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for deskroute operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors: missing or malformed rules, knowledge base,
    /// or model artifact. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Classifier training or inference errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Knowledge-base retrieval errors
    #[error("retrieval error: {0}")]
    Retrieval(String),

    /// Embedding model errors
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new retrieval error
    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::Retrieval(msg.into())
    }

    /// Create a new embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error must abort startup
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
