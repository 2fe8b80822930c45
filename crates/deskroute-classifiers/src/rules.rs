//! Keyword rule table and rule tagger
//!
//! The rule table maps category names to trigger keywords. The tagger
//! appends the names of all categories whose keywords occur in a text, which
//! injects a weak-supervision signal into the classifier's features.

use aho_corasick::AhoCorasick;
use deskroute_core::{Error, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use tracing::info;

/// A single category and its trigger keywords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Ordered mapping from category name to keywords.
///
/// Declaration order of the source document is preserved and drives the
/// order of emitted tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<CategoryRule>,
}

impl RuleTable {
    /// Build a table from `(category, keywords)` pairs.
    ///
    /// A repeated category replaces the keywords of the earlier entry and
    /// keeps its position.
    pub fn new<C, K, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (C, Vec<K>)>,
        C: Into<String>,
        K: Into<String>,
    {
        let mut table = Self::default();
        for (category, keywords) in entries {
            let category = category.into();
            if category.trim().is_empty() {
                return Err(Error::config("rule table contains an empty category name"));
            }
            table.insert(category, keywords.into_iter().map(Into::into).collect());
        }
        Ok(table)
    }

    fn insert(&mut self, category: String, keywords: Vec<String>) {
        match self.rules.iter_mut().find(|r| r.category == category) {
            Some(existing) => existing.keywords = keywords,
            None => self.rules.push(CategoryRule { category, keywords }),
        }
    }

    /// Parse a JSON rule document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::config(format!("malformed rule table: {}", e)))
    }

    /// Parse a YAML rule document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("malformed rule table: {}", e)))
    }

    /// Load a rule table from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::config(format!(
                "rule file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read rule file {}: {}", path.display(), e))
        })?;

        let table = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content)?,
            _ => Self::from_json(&content)?,
        };

        info!(
            "Loaded {} rule categories from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Rules in declaration order
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Category names in declaration order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.category.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Serialize for RuleTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for rule in &self.rules {
            map.serialize_entry(&rule.category, &rule.keywords)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RuleTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RuleTableVisitor;

        impl<'de> Visitor<'de> for RuleTableVisitor {
            type Value = RuleTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to a list of keywords")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<RuleTable, A::Error> {
                let mut table = RuleTable::default();
                while let Some((category, keywords)) = access.next_entry::<String, Vec<String>>()? {
                    if category.trim().is_empty() {
                        return Err(serde::de::Error::custom(
                            "rule table contains an empty category name",
                        ));
                    }
                    table.insert(category, keywords);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(RuleTableVisitor)
    }
}

/// Per-category keyword matcher over lowercased text
struct CategoryMatcher {
    category: String,
    keywords: AhoCorasick,
}

/// Appends matched category names to a text.
///
/// Serializes as its rule table; the matchers are rebuilt on load.
#[derive(Clone)]
pub struct RuleTagger {
    table: RuleTable,
    matchers: std::sync::Arc<Vec<CategoryMatcher>>,
}

impl RuleTagger {
    /// Compile a tagger for the given table
    pub fn new(table: RuleTable) -> Result<Self> {
        let matchers = table
            .rules()
            .iter()
            .map(|rule| {
                let lowered: Vec<String> = rule.keywords.iter().map(|k| k.to_lowercase()).collect();
                let keywords = AhoCorasick::new(&lowered).map_err(|e| {
                    Error::config(format!(
                        "failed to build keyword matcher for '{}': {}",
                        rule.category, e
                    ))
                })?;
                Ok(CategoryMatcher {
                    category: rule.category.clone(),
                    keywords,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            table,
            matchers: std::sync::Arc::new(matchers),
        })
    }

    /// Load and compile a tagger from a rule file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(RuleTable::from_file(path)?)
    }

    /// Categories whose keywords occur in `text`, in declaration order.
    ///
    /// Each category is checked with a single leftmost scan that stops at its
    /// first keyword hit; the next category is then scanned.
    pub fn matched_categories(&self, text: &str) -> Vec<&str> {
        let lowered = text.to_lowercase();
        self.matchers
            .iter()
            .filter(|m| m.keywords.is_match(&lowered))
            .map(|m| m.category.as_str())
            .collect()
    }

    /// Return `text` followed by a space and the space-joined matched
    /// category names. With no match the tag segment is empty.
    pub fn tag(&self, text: &str) -> String {
        let tags = self.matched_categories(text);
        let mut out = String::with_capacity(text.len() + 1 + tags.iter().map(|t| t.len() + 1).sum::<usize>());
        out.push_str(text);
        out.push(' ');
        out.push_str(&tags.join(" "));
        out
    }

    /// The rule table this tagger was built from
    pub fn table(&self) -> &RuleTable {
        &self.table
    }
}

impl fmt::Debug for RuleTagger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTagger")
            .field("categories", &self.table.len())
            .finish()
    }
}

impl Serialize for RuleTagger {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.table.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RuleTagger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let table = RuleTable::deserialize(deserializer)?;
        RuleTagger::new(table).map_err(serde::de::Error::custom)
    }
}
