//! Ordered transformation chain: rules → tf-idf → naive Bayes
//!
//! Every stage consumes and produces [`StageData`], so stages compose by
//! position alone. A stage rejects input of the wrong shape with a
//! classifier error.

use crate::config::ClassifierSettings;
use crate::naive_bayes::MultinomialNb;
use crate::rules::RuleTagger;
use crate::vectorizer::{SparseVector, TfidfVectorizer};
use deskroute_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Data flowing between pipeline stages
#[derive(Debug, Clone)]
pub enum StageData {
    /// Raw or tagged texts
    Texts(Vec<String>),

    /// Sparse feature rows over `n_features` columns
    Features {
        rows: Vec<SparseVector>,
        n_features: usize,
    },

    /// Per-class posteriors, one row per input
    Posteriors(Vec<Vec<f64>>),
}

impl StageData {
    fn kind(&self) -> &'static str {
        match self {
            Self::Texts(_) => "texts",
            Self::Features { .. } => "features",
            Self::Posteriors(_) => "posteriors",
        }
    }
}

/// A single stage in the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "stage", content = "state", rename_all = "snake_case")]
pub enum PipelineStage {
    /// Append keyword-rule category tags: texts → texts
    Rules(RuleTagger),

    /// Bag of n-grams with tf-idf weights: texts → features
    Tfidf(TfidfVectorizer),

    /// Multinomial naive Bayes: features → posteriors
    NaiveBayes(MultinomialNb),
}

impl PipelineStage {
    /// Stage name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rules(_) => "rules",
            Self::Tfidf(_) => "tfidf",
            Self::NaiveBayes(_) => "naive_bayes",
        }
    }

    /// Apply a fitted stage
    pub fn transform(&self, input: StageData) -> Result<StageData> {
        match (self, input) {
            (Self::Rules(tagger), StageData::Texts(texts)) => Ok(StageData::Texts(
                texts.iter().map(|t| tagger.tag(t)).collect(),
            )),
            (Self::Tfidf(vectorizer), StageData::Texts(texts)) => Ok(StageData::Features {
                rows: vectorizer.transform(&texts)?,
                n_features: vectorizer.n_features(),
            }),
            (Self::NaiveBayes(nb), StageData::Features { rows, .. }) => Ok(StageData::Posteriors(
                rows.iter()
                    .map(|row| nb.predict_proba(row))
                    .collect::<Result<_>>()?,
            )),
            (stage, other) => Err(Error::classifier(format!(
                "stage '{}' cannot consume {}",
                stage.name(),
                other.kind()
            ))),
        }
    }

    /// Fit the stage on `input`, then transform it
    pub fn fit_transform(&mut self, input: StageData, labels: &[String]) -> Result<StageData> {
        match (&mut *self, &input) {
            (Self::Rules(_), _) => {}
            (Self::Tfidf(vectorizer), StageData::Texts(texts)) => vectorizer.fit(texts)?,
            (Self::NaiveBayes(nb), StageData::Features { rows, n_features }) => {
                nb.fit(rows, labels, *n_features)?
            }
            _ => {}
        }
        self.transform(input)
    }
}

/// Ordered chain of stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPipeline {
    stages: Vec<PipelineStage>,
}

impl TextPipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Standard chain: rule tags, then tf-idf, then naive Bayes
    pub fn standard(tagger: RuleTagger, settings: &ClassifierSettings) -> Result<Self> {
        settings.validate()?;
        Ok(PipelineBuilder::new()
            .rules(tagger)
            .tfidf(TfidfVectorizer::new(settings)?)
            .naive_bayes(MultinomialNb::new(settings.alpha))
            .build())
    }

    /// Append a stage
    pub fn add_stage(mut self, stage: PipelineStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Fit every stage in order on the training texts
    pub fn fit(&mut self, texts: &[String], labels: &[String]) -> Result<()> {
        let start = Instant::now();
        let mut data = StageData::Texts(texts.to_vec());

        for stage in &mut self.stages {
            data = stage.fit_transform(data, labels)?;
            tracing::debug!("Fitted stage '{}'", stage.name());
        }

        tracing::info!(
            "Pipeline fitted on {} samples in {}ms",
            texts.len(),
            start.elapsed().as_millis()
        );
        Ok(())
    }

    /// Run every stage in order
    pub fn transform(&self, texts: &[String]) -> Result<StageData> {
        self.stages
            .iter()
            .try_fold(StageData::Texts(texts.to_vec()), |data, stage| stage.transform(data))
    }

    /// Posterior rows for the inputs; the chain must end in a classifier
    pub fn predict_proba(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        match self.transform(texts)? {
            StageData::Posteriors(rows) => Ok(rows),
            other => Err(Error::classifier(format!(
                "pipeline ends in {} instead of posteriors",
                other.kind()
            ))),
        }
    }

    /// Check that the stages are fitted and chain from texts to posteriors
    /// with matching feature counts
    pub fn check_fitted(&self) -> Result<()> {
        let mut features: Option<usize> = None;
        let mut kind = "texts";

        for stage in &self.stages {
            match (stage, kind) {
                (PipelineStage::Rules(_), "texts") => {}
                (PipelineStage::Tfidf(v), "texts") => {
                    if !v.is_fitted() {
                        return Err(Error::classifier("tf-idf stage is not fitted"));
                    }
                    features = Some(v.n_features());
                    kind = "features";
                }
                (PipelineStage::NaiveBayes(nb), "features") => {
                    if !nb.is_fitted() {
                        return Err(Error::classifier("naive Bayes stage is not fitted"));
                    }
                    if features != Some(nb.n_features()) {
                        return Err(Error::classifier(format!(
                            "naive Bayes expects {} features but the vectorizer produces {}",
                            nb.n_features(),
                            features.unwrap_or(0)
                        )));
                    }
                    kind = "posteriors";
                }
                (stage, other) => {
                    return Err(Error::classifier(format!(
                        "stage '{}' cannot consume {}",
                        stage.name(),
                        other
                    )))
                }
            }
        }

        if kind != "posteriors" {
            return Err(Error::classifier(format!(
                "pipeline ends in {} instead of posteriors",
                kind
            )));
        }
        Ok(())
    }

    /// Class labels of the final classifier stage
    pub fn classes(&self) -> Option<&[String]> {
        self.stages.iter().rev().find_map(|stage| match stage {
            PipelineStage::NaiveBayes(nb) => Some(nb.classes()),
            _ => None,
        })
    }

    /// The rule tagger stage, if present
    pub fn tagger(&self) -> Option<&RuleTagger> {
        self.stages.iter().find_map(|stage| match stage {
            PipelineStage::Rules(tagger) => Some(tagger),
            _ => None,
        })
    }

    /// The tf-idf stage, if present
    pub fn vectorizer(&self) -> Option<&TfidfVectorizer> {
        self.stages.iter().find_map(|stage| match stage {
            PipelineStage::Tfidf(v) => Some(v),
            _ => None,
        })
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    /// Get number of stages in pipeline
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl Default for TextPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing pipelines fluently
pub struct PipelineBuilder {
    pipeline: TextPipeline,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            pipeline: TextPipeline::new(),
        }
    }

    /// Add a rule tagging stage
    pub fn rules(mut self, tagger: RuleTagger) -> Self {
        self.pipeline = self.pipeline.add_stage(PipelineStage::Rules(tagger));
        self
    }

    /// Add a tf-idf stage
    pub fn tfidf(mut self, vectorizer: TfidfVectorizer) -> Self {
        self.pipeline = self.pipeline.add_stage(PipelineStage::Tfidf(vectorizer));
        self
    }

    /// Add a naive Bayes stage
    pub fn naive_bayes(mut self, nb: MultinomialNb) -> Self {
        self.pipeline = self.pipeline.add_stage(PipelineStage::NaiveBayes(nb));
        self
    }

    /// Build the pipeline
    pub fn build(self) -> TextPipeline {
        self.pipeline
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleTable;

    fn tagger() -> RuleTagger {
        RuleTagger::new(RuleTable::new([("access", vec!["пароль", "войти"])]).unwrap()).unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rules_stage_passes_texts_through() {
        let stage = PipelineStage::Rules(tagger());
        match stage.transform(StageData::Texts(strings(&["войти"]))).unwrap() {
            StageData::Texts(texts) => assert_eq!(texts, strings(&["войти access"])),
            other => panic!("unexpected {}", other.kind()),
        }
    }

    #[test]
    fn test_stage_rejects_wrong_input() {
        let stage = PipelineStage::NaiveBayes(MultinomialNb::new(0.1));
        let err = stage.transform(StageData::Texts(strings(&["x"]))).unwrap_err();
        assert!(err.to_string().contains("naive_bayes"));
    }

    #[test]
    fn test_standard_pipeline_fit_and_predict() {
        let texts = strings(&[
            "Не могу войти в систему",
            "Забыл пароль от почты",
            "SAP не подключается к базе",
            "Программа 1С не запускается",
        ]);
        let labels = strings(&["access", "access", "software", "software"]);

        let mut pipeline = TextPipeline::standard(tagger(), &ClassifierSettings::default()).unwrap();
        assert_eq!(pipeline.stage_count(), 3);
        pipeline.fit(&texts, &labels).unwrap();

        assert_eq!(pipeline.classes().unwrap(), &strings(&["access", "software"])[..]);
        assert!(pipeline.vectorizer().unwrap().vocabulary().contains_key("access"));

        let probs = pipeline.predict_proba(&strings(&["пароль не подходит"])).unwrap();
        assert_eq!(probs.len(), 1);
        assert!(probs[0][0] > probs[0][1]);
    }

    #[test]
    fn test_check_fitted() {
        let texts = strings(&["Не могу войти в систему", "SAP не подключается к базе"]);
        let labels = strings(&["access", "software"]);

        let mut pipeline = TextPipeline::standard(tagger(), &ClassifierSettings::default()).unwrap();
        assert!(pipeline.check_fitted().is_err());
        pipeline.fit(&texts, &labels).unwrap();
        assert!(pipeline.check_fitted().is_ok());

        let rules_only = PipelineBuilder::new().rules(tagger()).build();
        assert!(rules_only.check_fitted().is_err());
    }

    #[test]
    fn test_pipeline_without_classifier_has_no_posteriors() {
        let pipeline = PipelineBuilder::new().rules(tagger()).build();
        assert!(pipeline.predict_proba(&strings(&["войти"])).is_err());
        assert!(pipeline.classes().is_none());
    }
}
