//! deskroute Classifiers
//!
//! Category classification for support requests:
//! - Keyword rule table and rule tagger
//! - Tf-idf vectorizer and multinomial naive Bayes, chained in a
//!   [`TextPipeline`]
//! - [`TextClassifier`] with JSON artifact persistence
//! - [`EscalationPolicy`] confidence threshold
//!
//! Everything is synchronous and immutable once trained.

pub mod classifier;
pub mod config;
pub mod escalation;
pub mod naive_bayes;
pub mod pipeline;
pub mod rules;
pub mod vectorizer;

pub use classifier::{
    ClassificationMetadata, ClassificationResult, Classifier, TextClassifier,
    ARTIFACT_FORMAT_VERSION,
};
pub use config::ClassifierSettings;
pub use escalation::{EscalationPolicy, DEFAULT_THRESHOLD};
pub use naive_bayes::MultinomialNb;
pub use pipeline::{PipelineBuilder, PipelineStage, StageData, TextPipeline};
pub use rules::{CategoryRule, RuleTable, RuleTagger};
pub use vectorizer::{SparseVector, TfidfVectorizer};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationResult, Classifier, TextClassifier};
    pub use crate::config::ClassifierSettings;
    pub use crate::escalation::EscalationPolicy;
    pub use crate::rules::{RuleTable, RuleTagger};
}
