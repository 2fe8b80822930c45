//! The support desk: classify, decide, answer

use crate::config::DeskConfig;
use deskroute_classifiers::{ClassificationResult, Classifier, EscalationPolicy, TextClassifier};
use deskroute_core::Result;
use deskroute_retrieval::{from_config, RetrievalOutcome, SemanticRetriever};
use deskroute_telemetry::RouterMetrics;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Where a request ends up
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Route {
    /// Too uncertain, hand to a human operator
    Escalated { classification: ClassificationResult },

    /// Confident enough to answer from the knowledge base
    Answered {
        classification: ClassificationResult,
        answers: RetrievalOutcome,
    },
}

impl Route {
    pub fn classification(&self) -> &ClassificationResult {
        match self {
            Self::Escalated { classification } | Self::Answered { classification, .. } => {
                classification
            }
        }
    }

    pub fn is_escalated(&self) -> bool {
        matches!(self, Self::Escalated { .. })
    }
}

/// Classifier, escalation policy and retriever, immutable after construction
/// and shareable across threads.
#[derive(Clone)]
pub struct SupportDesk {
    classifier: Arc<dyn Classifier>,
    policy: EscalationPolicy,
    retriever: SemanticRetriever,
    top_k: usize,
    metrics: RouterMetrics,
}

impl SupportDesk {
    /// Assemble a desk from ready components
    pub fn new(
        classifier: Arc<dyn Classifier>,
        policy: EscalationPolicy,
        retriever: SemanticRetriever,
        top_k: usize,
    ) -> Self {
        Self {
            classifier,
            policy,
            retriever,
            top_k,
            metrics: RouterMetrics::new(),
        }
    }

    /// Load the classifier artifact, the embedder and the knowledge base.
    ///
    /// Any missing or malformed input fails the whole load.
    pub fn from_config(config: &DeskConfig) -> Result<Self> {
        let start = Instant::now();
        config.validate()?;

        let classifier = TextClassifier::load(&config.model_path)?;
        let embedder = from_config(&config.retrieval.embedder)?;
        let retriever = SemanticRetriever::load(&config.knowledge_base_dir, embedder)?;

        info!(
            "Support desk ready in {}ms: {} categories, {} articles, threshold {}",
            start.elapsed().as_millis(),
            classifier.categories().len(),
            retriever.len(),
            config.escalation.threshold
        );

        Ok(Self::new(
            Arc::new(classifier),
            EscalationPolicy::new(config.escalation.threshold),
            retriever,
            config.retrieval.top_k,
        ))
    }

    /// Share an external metrics collector
    pub fn with_metrics(mut self, metrics: RouterMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Category and confidence of a request
    pub fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.classifier.classify(text)
    }

    /// `true` when `confidence` is below the escalation threshold
    pub fn should_escalate(&self, confidence: f32) -> bool {
        self.policy.decide(confidence)
    }

    /// Knowledge-base articles most similar to `text`
    pub fn search_answers(&self, text: &str, top_k: usize) -> Result<RetrievalOutcome> {
        let outcome = self.retriever.retrieve(text, top_k)?;
        if outcome.is_knowledge_base_empty() {
            self.metrics.record_knowledge_base_empty();
        }
        Ok(outcome)
    }

    /// Classify, then either escalate or answer with the configured `top_k`
    pub fn route(&self, text: &str) -> Result<Route> {
        let start = Instant::now();
        let classification = self.classify(text)?;

        let route = if self.should_escalate(classification.score) {
            self.metrics.record_escalation(&classification.label);
            Route::Escalated { classification }
        } else {
            let answers = self.search_answers(text, self.top_k)?;
            self.metrics.record_answered(&classification.label);
            Route::Answered {
                classification,
                answers,
            }
        };

        self.metrics
            .record_request(start.elapsed().as_micros() as u64);
        debug!(
            "Routed to '{}' ({:.3}), escalated: {}",
            route.classification().label,
            route.classification().score,
            route.is_escalated()
        );
        Ok(route)
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    pub fn retriever(&self) -> &SemanticRetriever {
        &self.retriever
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn metrics(&self) -> &RouterMetrics {
        &self.metrics
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }
}

impl std::fmt::Debug for SupportDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupportDesk")
            .field("classifier", &self.classifier.name())
            .field("policy", &self.policy)
            .field("retriever", &self.retriever)
            .field("top_k", &self.top_k)
            .finish()
    }
}
