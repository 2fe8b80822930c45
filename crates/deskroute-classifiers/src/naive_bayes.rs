//! Multinomial naive Bayes over sparse tf-idf rows

use crate::vectorizer::SparseVector;
use deskroute_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Multinomial naive Bayes with additive smoothing.
///
/// Classes are kept in lexicographic order; `predict_proba` columns follow it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NbState", into = "NbState")]
pub struct MultinomialNb {
    alpha: f64,
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    /// `[class][feature]` log P(feature | class)
    feature_log_prob: Vec<Vec<f64>>,
}

/// Serialized form, checked for shape on the way in
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NbState {
    alpha: f64,
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
}

impl TryFrom<NbState> for MultinomialNb {
    type Error = Error;

    fn try_from(state: NbState) -> Result<Self> {
        let n_classes = state.classes.len();
        if state.class_log_prior.len() != n_classes || state.feature_log_prob.len() != n_classes {
            return Err(Error::classifier(format!(
                "naive Bayes has {} classes, {} priors and {} likelihood rows",
                n_classes,
                state.class_log_prior.len(),
                state.feature_log_prob.len()
            )));
        }

        let mut sorted = state.classes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted != state.classes {
            return Err(Error::classifier(
                "naive Bayes classes must be unique and sorted",
            ));
        }

        if let Some(first) = state.feature_log_prob.first() {
            if state.feature_log_prob.iter().any(|row| row.len() != first.len()) {
                return Err(Error::classifier(
                    "naive Bayes likelihood rows differ in length",
                ));
            }
        }
        let has_nan = state.class_log_prior.iter().any(|v| v.is_nan())
            || state.feature_log_prob.iter().flatten().any(|v| v.is_nan());
        if has_nan {
            return Err(Error::classifier("naive Bayes parameters contain NaN"));
        }

        Ok(Self {
            alpha: state.alpha,
            classes: state.classes,
            class_log_prior: state.class_log_prior,
            feature_log_prob: state.feature_log_prob,
        })
    }
}

impl From<MultinomialNb> for NbState {
    fn from(nb: MultinomialNb) -> Self {
        Self {
            alpha: nb.alpha,
            classes: nb.classes,
            class_log_prior: nb.class_log_prior,
            feature_log_prob: nb.feature_log_prob,
        }
    }
}

impl MultinomialNb {
    /// Create an unfitted model
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            classes: Vec::new(),
            class_log_prior: Vec::new(),
            feature_log_prob: Vec::new(),
        }
    }

    /// Fit class priors and per-class feature distributions
    pub fn fit(&mut self, rows: &[SparseVector], labels: &[String], n_features: usize) -> Result<()> {
        if rows.is_empty() {
            return Err(Error::classifier("cannot fit naive Bayes on zero samples"));
        }
        if rows.len() != labels.len() {
            return Err(Error::classifier(format!(
                "got {} feature rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(Error::classifier(format!(
                "alpha must be a positive number, got {}",
                self.alpha
            )));
        }

        let mut class_index: BTreeMap<&str, usize> = BTreeMap::new();
        for label in labels {
            class_index.entry(label.as_str()).or_insert(0);
        }
        for (idx, slot) in class_index.values_mut().enumerate() {
            *slot = idx;
        }
        let n_classes = class_index.len();

        let mut class_count = vec![0usize; n_classes];
        let mut feature_count = vec![vec![0.0f64; n_features]; n_classes];

        for (row, label) in rows.iter().zip(labels) {
            let c = class_index[label.as_str()];
            class_count[c] += 1;
            for &(feature, weight) in row {
                if feature >= n_features {
                    return Err(Error::classifier(format!(
                        "feature index {} out of range for {} features",
                        feature, n_features
                    )));
                }
                feature_count[c][feature] += weight;
            }
        }

        let total = rows.len() as f64;
        self.class_log_prior = class_count
            .iter()
            .map(|&count| (count as f64).ln() - total.ln())
            .collect();

        self.feature_log_prob = feature_count
            .into_iter()
            .map(|counts| {
                let denom = counts.iter().sum::<f64>() + self.alpha * n_features as f64;
                let log_denom = denom.ln();
                counts
                    .into_iter()
                    .map(|count| (count + self.alpha).ln() - log_denom)
                    .collect()
            })
            .collect();

        self.classes = class_index.into_keys().map(str::to_string).collect();
        Ok(())
    }

    /// Unnormalized joint log likelihood per class
    pub fn joint_log_likelihood(&self, row: &SparseVector) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(Error::classifier("naive Bayes model is not fitted"));
        }

        self.class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_probs)| {
                let mut score = *prior;
                for &(feature, weight) in row {
                    let log_prob = log_probs.get(feature).ok_or_else(|| {
                        Error::classifier(format!(
                            "feature index {} out of range for {} features",
                            feature,
                            log_probs.len()
                        ))
                    })?;
                    score += weight * log_prob;
                }
                Ok(score)
            })
            .collect()
    }

    /// Posterior probability per class, summing to 1
    pub fn predict_proba(&self, row: &SparseVector) -> Result<Vec<f64>> {
        let jll = self.joint_log_likelihood(row)?;
        Ok(softmax(&jll))
    }

    /// Most probable class and its posterior. Ties resolve to the earlier
    /// class in lexicographic order.
    pub fn predict(&self, row: &SparseVector) -> Result<(String, f64)> {
        let probs = self.predict_proba(row)?;
        let (best, prob) = argmax(&probs)
            .ok_or_else(|| Error::classifier("naive Bayes model has no classes"))?;
        Ok((self.classes[best].clone(), prob))
    }

    /// Class labels in column order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of features the likelihoods cover, 0 when unfitted
    pub fn n_features(&self) -> usize {
        self.feature_log_prob.first().map_or(0, Vec::len)
    }

    pub fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

/// Index and value of the first maximum
pub(crate) fn argmax(values: &[f64]) -> Option<(usize, f64)> {
    values.iter().copied().enumerate().fold(None, |best, (idx, v)| match best {
        Some((_, bv)) if v <= bv => best,
        _ => Some((idx, v)),
    })
}

fn softmax(log_values: &[f64]) -> Vec<f64> {
    let max = log_values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = log_values.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
