// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Title classifiers and the registry the evaluation harness runs over
//!
//! Implements:
//! - Pattern classifier (the hand-tuned listicle pattern)
//! - Keyword score baseline (additive keyword scoring)
//! - Closure-backed classifiers for externally supplied baselines
//!
//! The registry is an ordered list with exactly one baseline, always first.

use crate::errors::{EvalError, Result};
use crate::pattern::is_listicle_like;
use std::fmt;

/// Anything that can decide whether a title is a listicle
pub trait TitleClassifier: Send + Sync {
    /// Returns true if the title is predicted to be a listicle
    fn classify(&self, title: &str) -> bool;

    /// Predict for multiple titles
    fn classify_batch(&self, titles: &[&str]) -> Vec<bool> {
        titles.iter().map(|t| self.classify(t)).collect()
    }

    /// Name used as the report row label
    fn name(&self) -> &str;

    fn description(&self) -> &str;
}

/// The hand-tuned listicle title pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternClassifier;

impl PatternClassifier {
    pub const NAME: &'static str = "pattern";
}

impl TitleClassifier for PatternClassifier {
    fn classify(&self, title: &str) -> bool {
        is_listicle_like(title)
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Count token after a title/subtitle anchor (start, punctuation, emoji, cue word)"
    }
}

/// Keyword score baseline: adds up listicle cues and flags titles past a threshold
#[derive(Debug, Clone)]
pub struct KeywordScoreBaseline {
    /// Nouns that usually follow a list count ("7 tips")
    list_nouns: Vec<String>,
    /// Superlatives and other list cues
    cue_words: Vec<String>,
    /// Number words accepted as a leading count
    number_words: Vec<String>,
    leading_number_weight: u32,
    threshold: u32,
}

impl KeywordScoreBaseline {
    pub const NAME: &'static str = "keyword-score";

    pub fn new() -> Self {
        Self {
            list_nouns: [
                "ways", "tips", "reasons", "things", "tools", "mistakes", "lessons", "examples",
                "tricks", "habits", "steps", "ideas", "resources", "libraries", "extensions",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            cue_words: ["top", "best", "must", "every", "essential"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            number_words: [
                "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
                "eleven", "twelve", "fifteen", "twenty",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            leading_number_weight: 2,
            threshold: 3,
        }
    }

    fn tokenize(title: &str) -> Vec<String> {
        title
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    /// Additive listicle score for a title
    pub fn score(&self, title: &str) -> u32 {
        let tokens = Self::tokenize(title);

        let leading_number = tokens.first().is_some_and(|first| {
            first.chars().all(|c| c.is_ascii_digit()) || self.number_words.contains(first)
        });

        let nouns = self.list_nouns.iter().filter(|w| tokens.contains(w)).count() as u32;
        let cues = self.cue_words.iter().filter(|w| tokens.contains(w)).count() as u32;

        let mut score = nouns + cues;
        if leading_number {
            score += self.leading_number_weight;
        }
        score
    }
}

impl Default for KeywordScoreBaseline {
    fn default() -> Self {
        Self::new()
    }
}

impl TitleClassifier for KeywordScoreBaseline {
    fn classify(&self, title: &str) -> bool {
        self.score(title) >= self.threshold
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Additive score over leading numbers, list nouns and superlatives"
    }
}

/// Named classifier backed by a closure
pub struct FnClassifier<F> {
    name: String,
    description: String,
    f: F,
}

impl<F> FnClassifier<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            description: "Externally supplied classifier".to_string(),
            f,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl<F> TitleClassifier for FnClassifier<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn classify(&self, title: &str) -> bool {
        (self.f)(title)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Role of a registered classifier in the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Baseline,
    Candidate,
}

pub struct RegisteredClassifier {
    pub role: Role,
    pub classifier: Box<dyn TitleClassifier>,
}

impl RegisteredClassifier {
    pub fn name(&self) -> &str {
        self.classifier.name()
    }

    pub fn is_baseline(&self) -> bool {
        self.role == Role::Baseline
    }
}

impl fmt::Debug for RegisteredClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredClassifier")
            .field("name", &self.name())
            .field("role", &self.role)
            .finish()
    }
}

/// Ordered classifier list; the first entry is the baseline
#[derive(Debug)]
pub struct ClassifierRegistry {
    entries: Vec<RegisteredClassifier>,
}

impl ClassifierRegistry {
    pub fn new(baseline: Box<dyn TitleClassifier>) -> Self {
        Self {
            entries: vec![RegisteredClassifier {
                role: Role::Baseline,
                classifier: baseline,
            }],
        }
    }

    /// Add a candidate compared against the baseline
    pub fn register(&mut self, classifier: Box<dyn TitleClassifier>) -> Result<()> {
        if self.get(classifier.name()).is_some() {
            return Err(EvalError::DuplicateClassifier(classifier.name().to_string()));
        }
        self.entries.push(RegisteredClassifier {
            role: Role::Candidate,
            classifier,
        });
        Ok(())
    }

    /// Builder-style `register`
    pub fn with_candidate(mut self, classifier: Box<dyn TitleClassifier>) -> Result<Self> {
        self.register(classifier)?;
        Ok(self)
    }

    /// Register every built-in classifier, using the one named `baseline` as baseline
    pub fn from_builtins(baseline: &str) -> Result<Self> {
        let mut builtins = builtin_classifiers();
        let idx = builtins
            .iter()
            .position(|c| c.name() == baseline)
            .ok_or_else(|| EvalError::UnknownClassifier(baseline.to_string()))?;

        let mut registry = Self::new(builtins.remove(idx));
        for classifier in builtins {
            registry.register(classifier)?;
        }
        Ok(registry)
    }

    pub fn baseline(&self) -> &RegisteredClassifier {
        &self.entries[0]
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredClassifier> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// Entries in registration order, baseline first
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredClassifier> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ClassifierRegistry {
    /// Keyword score baseline plus the pattern classifier
    fn default() -> Self {
        Self {
            entries: vec![
                RegisteredClassifier {
                    role: Role::Baseline,
                    classifier: Box::new(KeywordScoreBaseline::new()),
                },
                RegisteredClassifier {
                    role: Role::Candidate,
                    classifier: Box::new(PatternClassifier),
                },
            ],
        }
    }
}

/// Factory function to create all built-in classifiers
pub fn builtin_classifiers() -> Vec<Box<dyn TitleClassifier>> {
    vec![
        Box::new(KeywordScoreBaseline::new()),
        Box::new(PatternClassifier),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_classifier() {
        let classifier = PatternClassifier;
        assert!(classifier.classify("5 Best Productivity Tips"));
        assert!(!classifier.classify("Released in 2023"));
        assert_eq!(
            classifier.classify_batch(&["My Top Ten Movies", "Hello world"]),
            vec![true, false]
        );
    }

    #[test]
    fn test_keyword_score() {
        let baseline = KeywordScoreBaseline::new();

        // leading number + "best" + "tips"
        assert_eq!(baseline.score("5 Best Productivity Tips"), 4);
        assert!(baseline.classify("5 Best Productivity Tips"));

        // "top" + "tools" only
        assert_eq!(baseline.score("Top tools for Rust"), 2);
        assert!(!baseline.classify("Top tools for Rust"));

        assert_eq!(baseline.score("Twelve habits of great reviewers"), 3);
        assert_eq!(baseline.score("Released in 2023"), 0);
        assert_eq!(baseline.score(""), 0);
    }

    #[test]
    fn test_fn_classifier() {
        let classifier = FnClassifier::new("always", |_| true).with_description("Always yes");
        assert!(classifier.classify("anything"));
        assert_eq!(classifier.name(), "always");
        assert_eq!(classifier.description(), "Always yes");
    }

    #[test]
    fn test_registry_order() {
        let baseline = FnClassifier::new("zzz-baseline", |_| false);
        let registry = ClassifierRegistry::new(Box::new(baseline))
            .with_candidate(Box::new(PatternClassifier))
            .unwrap()
            .with_candidate(Box::new(FnClassifier::new("aaa", |_| true)))
            .unwrap();

        assert_eq!(registry.names(), vec!["zzz-baseline", "pattern", "aaa"]);
        assert!(registry.baseline().is_baseline());
        assert_eq!(registry.baseline().name(), "zzz-baseline");
        assert_eq!(registry.get("aaa").unwrap().role, Role::Candidate);
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = ClassifierRegistry::new(Box::new(PatternClassifier));
        let err = registry.register(Box::new(PatternClassifier)).unwrap_err();
        assert!(matches!(err, EvalError::DuplicateClassifier(name) if name == "pattern"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_builtins() {
        let registry = ClassifierRegistry::from_builtins(PatternClassifier::NAME).unwrap();
        assert_eq!(registry.names(), vec!["pattern", "keyword-score"]);

        let registry = ClassifierRegistry::default();
        assert_eq!(registry.names(), vec!["keyword-score", "pattern"]);

        let err = ClassifierRegistry::from_builtins("nope").unwrap_err();
        assert!(matches!(err, EvalError::UnknownClassifier(_)));
    }
}
