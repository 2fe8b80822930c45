//! Bag-of-n-grams tf-idf vectorizer

use crate::config::ClassifierSettings;
use deskroute_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Words of two or more word characters
const TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Sparse row: `(feature index, weight)` pairs sorted by index
pub type SparseVector = Vec<(usize, f64)>;

/// Fitted state, the serialized form of the vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TfidfState {
    ngram_range: (usize, usize),
    max_features: usize,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

/// Lowercasing n-gram tf-idf vectorizer with smooth idf and L2-normalized rows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TfidfState", into = "TfidfState")]
pub struct TfidfVectorizer {
    state: TfidfState,
    token_regex: Regex,
}

impl TfidfVectorizer {
    /// Create an unfitted vectorizer
    pub fn new(settings: &ClassifierSettings) -> Result<Self> {
        Self::from_state(TfidfState {
            ngram_range: settings.ngram_range,
            max_features: settings.max_features,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        })
    }

    fn from_state(state: TfidfState) -> Result<Self> {
        let (min_n, max_n) = state.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::classifier(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }
        if state.vocabulary.len() != state.idf.len() {
            return Err(Error::classifier(format!(
                "vocabulary has {} terms but idf has {} weights",
                state.vocabulary.len(),
                state.idf.len()
            )));
        }

        let mut seen = vec![false; state.idf.len()];
        for (term, &idx) in &state.vocabulary {
            match seen.get_mut(idx) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(Error::classifier(format!(
                        "feature index {} assigned to more than one term",
                        idx
                    )))
                }
                None => {
                    return Err(Error::classifier(format!(
                        "term '{}' has feature index {} out of range for {} features",
                        term,
                        idx,
                        state.idf.len()
                    )))
                }
            }
        }
        if let Some(w) = state.idf.iter().find(|w| !w.is_finite()) {
            return Err(Error::classifier(format!("non-finite idf weight {}", w)));
        }
        let token_regex = Regex::new(TOKEN_PATTERN)
            .map_err(|e| Error::classifier(format!("Failed to compile token regex: {}", e)))?;
        Ok(Self { state, token_regex })
    }

    /// Lowercased word tokens
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.token_regex
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Word n-grams for every length in the configured range
    pub fn ngrams(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenize(text);
        let (min_n, max_n) = self.state.ngram_range;
        let mut grams = Vec::new();

        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                grams.push(window.join(" "));
            }
        }

        grams
    }

    /// Learn the vocabulary and idf weights.
    ///
    /// The vocabulary keeps the `max_features` terms with the highest total
    /// count (ties alphabetical); feature indices follow alphabetical order.
    pub fn fit(&mut self, texts: &[String]) -> Result<()> {
        if texts.is_empty() {
            return Err(Error::classifier("cannot fit vectorizer on an empty corpus"));
        }

        let docs: Vec<Vec<String>> = texts.iter().map(|t| self.ngrams(t)).collect();

        let mut term_counts: HashMap<&str, usize> = HashMap::new();
        for doc in &docs {
            for gram in doc {
                *term_counts.entry(gram.as_str()).or_insert(0) += 1;
            }
        }

        if term_counts.is_empty() {
            return Err(Error::classifier(
                "empty vocabulary; training texts contain no words of two or more characters",
            ));
        }

        let mut ranked: Vec<(&str, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.state.max_features);

        let mut kept: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();
        let vocabulary: BTreeMap<String, usize> = kept
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();

        let mut df = vec![0usize; vocabulary.len()];
        for doc in &docs {
            let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for gram in unique {
                if let Some(&idx) = vocabulary.get(gram) {
                    df[idx] += 1;
                }
            }
        }

        let n_docs = docs.len() as f64;
        self.state.idf = df
            .iter()
            .map(|&d| ((1.0 + n_docs) / (1.0 + d as f64)).ln() + 1.0)
            .collect();
        self.state.vocabulary = vocabulary;

        tracing::debug!(
            "Fitted tf-idf vocabulary: {} terms from {} documents",
            self.state.vocabulary.len(),
            docs.len()
        );
        Ok(())
    }

    /// Vectorize one text. Out-of-vocabulary n-grams are ignored.
    pub fn transform_one(&self, text: &str) -> Result<SparseVector> {
        if !self.is_fitted() {
            return Err(Error::classifier("tf-idf vectorizer is not fitted"));
        }

        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for gram in self.ngrams(text) {
            if let Some(&idx) = self.state.vocabulary.get(&gram) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseVector = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.state.idf[idx]))
            .collect();

        let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut row {
                *w /= norm;
            }
        }

        Ok(row)
    }

    /// Vectorize many texts
    pub fn transform(&self, texts: &[String]) -> Result<Vec<SparseVector>> {
        texts.iter().map(|t| self.transform_one(t)).collect()
    }

    pub fn is_fitted(&self) -> bool {
        !self.state.vocabulary.is_empty()
    }

    /// Number of features (vocabulary size)
    pub fn n_features(&self) -> usize {
        self.state.vocabulary.len()
    }

    /// Learned vocabulary, term to feature index
    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.state.vocabulary
    }

    /// Idf weight of a term, if it is in the vocabulary
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.state
            .vocabulary
            .get(term)
            .map(|&idx| self.state.idf[idx])
    }
}

impl TryFrom<TfidfState> for TfidfVectorizer {
    type Error = Error;

    fn try_from(state: TfidfState) -> Result<Self> {
        Self::from_state(state)
    }
}

impl From<TfidfVectorizer> for TfidfState {
    fn from(vectorizer: TfidfVectorizer) -> Self {
        vectorizer.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "Не могу войти в систему".to_string(),
            "Пароль не подходит, не могу войти".to_string(),
            "SAP не подключается к базе".to_string(),
        ]
    }

    #[test]
    fn test_tokenize_drops_single_characters() {
        let v = TfidfVectorizer::new(&ClassifierSettings::default()).unwrap();
        assert_eq!(v.tokenize("Не могу войти в систему"), vec!["не", "могу", "войти", "систему"]);
        assert_eq!(v.tokenize("a b SAP_x 1С"), vec!["sap_x", "1с"]);
    }

    #[test]
    fn test_unigrams_and_bigrams() {
        let v = TfidfVectorizer::new(&ClassifierSettings::default()).unwrap();
        assert_eq!(
            v.ngrams("войти в систему сейчас"),
            vec!["войти", "систему", "сейчас", "войти систему", "систему сейчас"]
        );
        assert_eq!(v.ngrams("пароль"), vec!["пароль"]);
        assert!(v.ngrams("").is_empty());
    }

    #[test]
    fn test_fit_idf_is_smooth() {
        let mut v = TfidfVectorizer::new(&ClassifierSettings::default()).unwrap();
        v.fit(&corpus()).unwrap();

        // "не" appears in all 3 documents: ln(4/4) + 1
        assert!((v.idf("не").unwrap() - 1.0).abs() < 1e-12);
        // "sap" appears in 1 document: ln(4/2) + 1
        assert!((v.idf("sap").unwrap() - (2.0f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let settings = ClassifierSettings::default().with_max_features(2);
        let mut v = TfidfVectorizer::new(&settings).unwrap();
        v.fit(&corpus()).unwrap();

        // "не" occurs 4 times, then a four-way tie at 2 broken alphabetically
        let terms: Vec<&String> = v.vocabulary().keys().collect();
        assert_eq!(terms, vec!["войти", "не"]);
        assert_eq!(v.vocabulary()["войти"], 0);
        assert_eq!(v.vocabulary()["не"], 1);
    }

    #[test]
    fn test_rows_are_l2_normalized() {
        let mut v = TfidfVectorizer::new(&ClassifierSettings::default()).unwrap();
        v.fit(&corpus()).unwrap();

        let row = v.transform_one("не могу войти, пароль").unwrap();
        let norm: f64 = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
        assert!(row.windows(2).all(|w| w[0].0 < w[1].0));

        let empty = v.transform_one("совсем другое").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_unfitted_transform_fails() {
        let v = TfidfVectorizer::new(&ClassifierSettings::default()).unwrap();
        assert!(v.transform_one("text").is_err());
    }

    #[test]
    fn test_fit_without_words_fails() {
        let mut v = TfidfVectorizer::new(&ClassifierSettings::default()).unwrap();
        assert!(v.fit(&["a b c".to_string(), "!".to_string()]).is_err());
        assert!(v.fit(&[]).is_err());
    }

    #[test]
    fn test_inconsistent_state_is_rejected() {
        let mut v = TfidfVectorizer::new(&ClassifierSettings::default()).unwrap();
        v.fit(&corpus()).unwrap();
        let state: serde_json::Value = serde_json::to_value(&v).unwrap();

        let mut zero_ngram = state.clone();
        zero_ngram["ngram_range"] = serde_json::json!([0, 2]);
        assert!(serde_json::from_value::<TfidfVectorizer>(zero_ngram).is_err());

        let mut reversed = state.clone();
        reversed["ngram_range"] = serde_json::json!([2, 1]);
        assert!(serde_json::from_value::<TfidfVectorizer>(reversed).is_err());

        let mut out_of_range = state.clone();
        out_of_range["vocabulary"]["не"] = serde_json::json!(100000);
        assert!(serde_json::from_value::<TfidfVectorizer>(out_of_range).is_err());

        let mut duplicate = state;
        let sap = duplicate["vocabulary"]["sap"].clone();
        duplicate["vocabulary"]["не"] = sap;
        assert!(serde_json::from_value::<TfidfVectorizer>(duplicate).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut v = TfidfVectorizer::new(&ClassifierSettings::default()).unwrap();
        v.fit(&corpus()).unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let restored: TfidfVectorizer = serde_json::from_str(&json).unwrap();
        assert_eq!(
            restored.transform_one("SAP не подключается").unwrap(),
            v.transform_one("SAP не подключается").unwrap()
        );
    }
}
