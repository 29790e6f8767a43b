// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Accuracy metrics for listicle classifiers
//!
//! - Per ground-truth kind tallies (ok count, total, rate, misclassified titles)
//! - False-positive / false-negative thresholds
//! - The run results artifact (classifier name -> kind -> tally)

use crate::classifiers::TitleClassifier;
use crate::datasets::Category;
use crate::errors::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Slack for comparing an error rate against its maximum
pub const RATE_TOLERANCE: f64 = 1e-12;

/// Maximum allowed error rates, fixed for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyThresholds {
    /// Share of "other" titles that may be flagged as listicles
    pub false_positive_rate_max: f64,
    /// Share of listicles that may be missed
    pub false_negative_rate_max: f64,
}

impl Default for AccuracyThresholds {
    fn default() -> Self {
        Self {
            false_positive_rate_max: 0.025,
            false_negative_rate_max: 0.5,
        }
    }
}

impl AccuracyThresholds {
    pub fn new(false_positive_rate_max: f64, false_negative_rate_max: f64) -> Result<Self> {
        let thresholds = Self {
            false_positive_rate_max,
            false_negative_rate_max,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Both maxima must be within [0, 1] (NaN is rejected)
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("false positive rate max", self.false_positive_rate_max),
            ("false negative rate max", self.false_negative_rate_max),
        ];
        for (name, value) in checks {
            if !(0.0..=1.0).contains(&value) {
                return Err(EvalError::InvalidThreshold { name, value });
            }
        }
        Ok(())
    }

    /// Maximum error rate for titles of the given ground truth
    pub fn max_error_rate(&self, kind: Category) -> f64 {
        match kind {
            Category::Listicle => self.false_negative_rate_max,
            Category::Other => self.false_positive_rate_max,
        }
    }
}

/// Which error rate applies to a ground-truth kind
pub fn error_rate_name(kind: Category) -> &'static str {
    match kind {
        Category::Listicle => "false-negative rate",
        Category::Other => "false-positive rate",
    }
}

/// Outcome of one classifier over one ground-truth group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindResult {
    pub num_ok: usize,
    pub total: usize,
    /// num_ok / total; 1.0 for an empty group
    pub rate: f64,
    /// Misclassified titles in dataset order
    pub failures: Vec<String>,
}

impl KindResult {
    /// Build from the group size and the titles the classifier got wrong
    pub fn from_failures(total: usize, failures: Vec<String>) -> Self {
        debug_assert!(failures.len() <= total);
        let num_ok = total.saturating_sub(failures.len());
        let rate = if total == 0 {
            1.0
        } else {
            num_ok as f64 / total as f64
        };
        Self {
            num_ok,
            total,
            rate,
            failures,
        }
    }

    /// Run a classifier over every title of one ground-truth group
    pub fn tally(classifier: &dyn TitleClassifier, titles: &[&str], kind: Category) -> Self {
        let expected = kind.expected_prediction();
        let failures: Vec<String> = titles
            .iter()
            .zip(classifier.classify_batch(titles))
            .filter(|(_, predicted)| *predicted != expected)
            .map(|(title, _)| title.to_string())
            .collect();
        Self::from_failures(titles.len(), failures)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Share of misclassified titles; 0.0 for an empty group
    pub fn error_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.failures.len() as f64 / self.total as f64
    }

    /// Error rate does not exceed `max` (equality passes)
    pub fn within(&self, max: f64) -> bool {
        self.error_rate() - max <= RATE_TOLERANCE
    }
}

/// Both ground-truth kinds for one classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierResults {
    pub listicles: KindResult,
    pub others: KindResult,
}

impl ClassifierResults {
    pub fn kind(&self, kind: Category) -> &KindResult {
        match kind {
            Category::Listicle => &self.listicles,
            Category::Other => &self.others,
        }
    }

    pub fn total(&self) -> usize {
        self.listicles.total + self.others.total
    }

    /// Share of correctly classified titles over both kinds
    pub fn overall_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 1.0;
        }
        (self.listicles.num_ok + self.others.num_ok) as f64 / total as f64
    }

    pub fn rates(&self) -> RateSummary {
        RateSummary {
            all: self.overall_rate(),
            listicles: self.listicles.rate,
            others: self.others.rate,
        }
    }
}

/// Overall and per-kind accuracy for one classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSummary {
    pub all: f64,
    pub listicles: f64,
    pub others: f64,
}

impl RateSummary {
    /// Signed difference to another summary (self - other)
    pub fn delta(&self, other: &RateSummary) -> RateSummary {
        RateSummary {
            all: self.all - other.all,
            listicles: self.listicles - other.listicles,
            others: self.others - other.others,
        }
    }
}

/// Results of one evaluation run, keyed by classifier name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunResults {
    classifiers: BTreeMap<String, ClassifierResults>,
}

impl RunResults {
    pub(crate) fn insert(&mut self, name: impl Into<String>, results: ClassifierResults) {
        self.classifiers.insert(name.into(), results);
    }

    pub fn get(&self, name: &str) -> Option<&ClassifierResults> {
        self.classifiers.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClassifierResults)> {
        self.classifiers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    /// Write as pretty JSON, replacing any previous artifact
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EvalError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| EvalError::io(path, e))?;
        tracing::info!("Results saved to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        Ok(serde_json::from_str(&data)?)
    }
}
