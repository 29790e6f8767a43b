// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Accuracy evaluation pipeline for listicle classifiers
//!
//! Orchestrates:
//! - Labeled dataset loading and the reference-title integrity check
//! - Per classifier, per ground-truth kind tallies
//! - False-positive / false-negative threshold enforcement
//! - Results serialization and the comparison report

use crate::classifiers::{ClassifierRegistry, TitleClassifier};
use crate::datasets::{load_reference_titles, Category, LabeledDataset};
use crate::errors::{EvalError, Result};
use crate::metrics::{
    error_rate_name, AccuracyThresholds, ClassifierResults, KindResult, RunResults,
};
use crate::report::ComparisonReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Labeled CSV (`title`, `category`)
    pub dataset_path: PathBuf,
    /// Raw article dump the labels were produced from (JSON array with `title`)
    pub reference_path: Option<PathBuf>,
    /// Where the run results artifact is written
    pub results_path: PathBuf,
    /// Optional markdown copy of the comparison report
    pub report_path: Option<PathBuf>,
    /// Name of the classifier the others are compared against
    pub baseline: String,
    pub thresholds: AccuracyThresholds,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/labeled.csv"),
            reference_path: None,
            results_path: PathBuf::from("results.json"),
            report_path: None,
            baseline: "keyword-score".to_string(),
            thresholds: AccuracyThresholds::default(),
        }
    }
}

/// A classifier exceeded the allowed error rate for one ground-truth kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdViolation {
    pub classifier: String,
    pub kind: Category,
    pub error_rate: f64,
    pub max: f64,
}

impl fmt::Display for ThresholdViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {}: {} {:.2}% exceeds {:.2}%",
            self.classifier,
            self.kind,
            error_rate_name(self.kind),
            self.error_rate * 100.0,
            self.max * 100.0
        )
    }
}

/// Result of evaluating one classifier on one ground-truth kind
#[derive(Debug, Clone)]
pub struct KindEvaluation {
    pub result: KindResult,
    pub violation: Option<ThresholdViolation>,
}

/// Everything produced by an evaluation run
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub results: RunResults,
    pub baseline: String,
    pub thresholds: AccuracyThresholds,
    pub violations: Vec<ThresholdViolation>,
    /// (classifier, kind) pairs whose ground-truth group was empty
    pub empty_groups: Vec<(String, Category)>,
    pub timestamp: DateTime<Utc>,
}

impl EvaluationOutcome {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Fail if any classifier/kind exceeded its threshold
    pub fn ensure_passed(&self) -> Result<()> {
        if self.passed() {
            return Ok(());
        }
        let summary = self
            .violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(EvalError::ThresholdViolations {
            count: self.violations.len(),
            summary,
        })
    }

    pub fn report(&self) -> Result<ComparisonReport> {
        ComparisonReport::build(&self.results, &self.baseline)
    }
}

/// Runs classifiers over a labeled dataset and enforces thresholds
#[derive(Debug, Clone)]
pub struct EvaluationHarness {
    thresholds: AccuracyThresholds,
}

impl EvaluationHarness {
    pub fn new(thresholds: AccuracyThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &AccuracyThresholds {
        &self.thresholds
    }

    /// Tally one ground-truth group and check it against its threshold.
    ///
    /// Empty groups pass vacuously (rate 1.0) and are never checked.
    pub fn evaluate_kind(
        &self,
        classifier: &dyn TitleClassifier,
        titles: &[&str],
        kind: Category,
    ) -> KindEvaluation {
        let result = KindResult::tally(classifier, titles, kind);
        let max = self.thresholds.max_error_rate(kind);

        let violation = if result.is_empty() || result.within(max) {
            None
        } else {
            Some(ThresholdViolation {
                classifier: classifier.name().to_string(),
                kind,
                error_rate: result.error_rate(),
                max,
            })
        };

        KindEvaluation { result, violation }
    }

    /// Evaluate every registered classifier; violations are collected, not fatal
    pub fn run(
        &self,
        dataset: &LabeledDataset,
        registry: &ClassifierRegistry,
    ) -> EvaluationOutcome {
        let partition = dataset.partition();
        let mut results = RunResults::default();
        let mut violations = Vec::new();
        let mut empty_groups = Vec::new();

        for entry in registry.iter() {
            let name = entry.name();
            tracing::info!("Evaluating classifier: {}", name);

            let mut evaluate = |kind: Category| {
                let evaluation =
                    self.evaluate_kind(entry.classifier.as_ref(), partition.group(kind), kind);

                if evaluation.result.is_empty() {
                    tracing::warn!(
                        "{} / {}: no titles in group, treating as a vacuous pass",
                        name,
                        kind
                    );
                    empty_groups.push((name.to_string(), kind));
                }
                for title in &evaluation.result.failures {
                    tracing::debug!("{} misclassified {} title: {}", name, kind, title);
                }
                if let Some(violation) = evaluation.violation {
                    tracing::error!("Threshold violated: {}", violation);
                    violations.push(violation);
                }
                evaluation.result
            };

            let listicles = evaluate(Category::Listicle);
            let others = evaluate(Category::Other);

            let classifier_results = ClassifierResults { listicles, others };
            tracing::info!(
                "  {} - All: {:.4}, Listicles: {:.4}, Others: {:.4}",
                name,
                classifier_results.overall_rate(),
                classifier_results.listicles.rate,
                classifier_results.others.rate
            );

            results.insert(name, classifier_results);
        }

        EvaluationOutcome {
            results,
            baseline: registry.baseline().name().to_string(),
            thresholds: self.thresholds,
            violations,
            empty_groups,
            timestamp: Utc::now(),
        }
    }
}

/// Main evaluation pipeline: file I/O around the harness
pub struct EvaluationPipeline {
    config: EvaluationConfig,
}

impl EvaluationPipeline {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Load the labeled dataset and verify it against the reference source, if configured
    pub fn load_dataset(&self) -> Result<LabeledDataset> {
        let dataset = LabeledDataset::load_csv(&self.config.dataset_path)?;

        if let Some(ref reference_path) = self.config.reference_path {
            tracing::info!("Checking labeled titles against {}", reference_path.display());
            let reference = load_reference_titles(reference_path)?;
            dataset.verify_against_reference(&reference)?;
        }

        let dist = dataset.label_distribution();
        tracing::info!(
            "Dataset loaded: {} titles (listicle={}, other={})",
            dataset.len(),
            dist.get(&Category::Listicle).copied().unwrap_or(0),
            dist.get(&Category::Other).copied().unwrap_or(0)
        );

        Ok(dataset)
    }

    /// Load data and evaluate every registered classifier
    pub fn run(&self, registry: &ClassifierRegistry) -> Result<EvaluationOutcome> {
        let registered = registry.baseline().name();
        if registered != self.config.baseline {
            return Err(EvalError::BaselineMismatch {
                configured: self.config.baseline.clone(),
                registered: registered.to_string(),
            });
        }

        let harness = EvaluationHarness::new(self.config.thresholds)?;
        let dataset = self.load_dataset()?;
        Ok(harness.run(&dataset, registry))
    }

    /// Persist the run results and, if configured, the markdown report
    pub fn save_outputs(
        &self,
        outcome: &EvaluationOutcome,
        report: &ComparisonReport,
    ) -> Result<()> {
        outcome.results.save(&self.config.results_path)?;

        if let Some(ref report_path) = self.config.report_path {
            let markdown = report.render_markdown(outcome);
            std::fs::write(report_path, markdown).map_err(|e| EvalError::io(report_path, e))?;
            tracing::info!("Markdown report saved to {}", report_path.display());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::{FnClassifier, PatternClassifier};
    use crate::datasets::LabeledTitle;
    use std::collections::HashSet;

    /// 100 listicles where every title in `missed` is not recognised, plus `others` other titles
    fn dataset_with_misses(missed: usize, others: usize) -> LabeledDataset {
        let mut titles: Vec<LabeledTitle> = (0..100)
            .map(|i| {
                let title = if i < missed {
                    format!("missed listicle {}", i)
                } else {
                    format!("found listicle {}", i)
                };
                LabeledTitle::new(title, Category::Listicle)
            })
            .collect();
        titles.extend(
            (0..others).map(|i| LabeledTitle::new(format!("plain {}", i), Category::Other)),
        );
        LabeledDataset::new(titles)
    }

    fn prefix_classifier() -> FnClassifier<impl Fn(&str) -> bool + Send + Sync> {
        FnClassifier::new("prefix", |t: &str| t.starts_with("found"))
    }

    fn thresholds(fp: f64, fn_: f64) -> AccuracyThresholds {
        AccuracyThresholds::new(fp, fn_).unwrap()
    }

    #[test]
    fn test_false_negative_violation() {
        let harness = EvaluationHarness::new(thresholds(0.025, 0.025)).unwrap();
        let registry = ClassifierRegistry::new(Box::new(prefix_classifier()));
        let outcome = harness.run(&dataset_with_misses(3, 10), &registry);

        let listicles = &outcome.results.get("prefix").unwrap().listicles;
        assert_eq!(listicles.num_ok, 97);
        assert_eq!(listicles.failures.len(), 3);

        assert_eq!(outcome.violations.len(), 1);
        let violation = &outcome.violations[0];
        assert_eq!(violation.kind, Category::Listicle);
        assert!((violation.error_rate - 0.03).abs() < 1e-12);
        assert!(!outcome.passed());
        assert!(matches!(
            outcome.ensure_passed(),
            Err(EvalError::ThresholdViolations { count: 1, .. })
        ));
    }

    #[test]
    fn test_threshold_equality_passes() {
        let registry = ClassifierRegistry::new(Box::new(prefix_classifier()));
        let dataset = dataset_with_misses(3, 10);

        let harness = EvaluationHarness::new(thresholds(0.0, 0.03)).unwrap();
        assert!(harness.run(&dataset, &registry).passed());

        // one more miss crosses the boundary
        let outcome = harness.run(&dataset_with_misses(4, 10), &registry);
        assert_eq!(outcome.violations.len(), 1);
    }

    #[test]
    fn test_false_positive_violation() {
        let harness = EvaluationHarness::new(thresholds(0.025, 1.0)).unwrap();
        let flag_all = FnClassifier::new("flag-all", |_: &str| true);
        let evaluation = harness.evaluate_kind(&flag_all, &["a", "b"], Category::Other);

        assert_eq!(evaluation.result.num_ok, 0);
        let violation = evaluation.violation.unwrap();
        assert_eq!(violation.kind, Category::Other);
        assert_eq!(violation.error_rate, 1.0);
        assert!(violation.to_string().contains("false-positive rate"));
    }

    #[test]
    fn test_violations_do_not_stop_other_classifiers() {
        let harness = EvaluationHarness::new(thresholds(0.0, 0.0)).unwrap();
        let never = FnClassifier::new("never", |_: &str| false);
        let registry = ClassifierRegistry::new(Box::new(never))
            .with_candidate(Box::new(FnClassifier::new("always", |_: &str| true)))
            .unwrap()
            .with_candidate(Box::new(prefix_classifier()))
            .unwrap();

        let outcome = harness.run(&dataset_with_misses(0, 5), &registry);

        assert_eq!(outcome.results.len(), 3);
        let failing: HashSet<_> = outcome
            .violations
            .iter()
            .map(|v| (v.classifier.as_str(), v.kind))
            .collect();
        assert_eq!(
            failing,
            HashSet::from([("never", Category::Listicle), ("always", Category::Other)])
        );
        assert_eq!(outcome.results.get("prefix").unwrap().overall_rate(), 1.0);
    }

    #[test]
    fn test_empty_group_is_reported_not_nan() {
        let harness = EvaluationHarness::new(AccuracyThresholds::default()).unwrap();
        let registry = ClassifierRegistry::new(Box::new(PatternClassifier));
        let dataset = LabeledDataset::new(vec![LabeledTitle::new(
            "5 Best Productivity Tips",
            Category::Listicle,
        )]);

        let outcome = harness.run(&dataset, &registry);

        assert!(outcome.passed());
        assert_eq!(outcome.empty_groups, vec![("pattern".to_string(), Category::Other)]);
        let others = &outcome.results.get("pattern").unwrap().others;
        assert_eq!(others.total, 0);
        assert_eq!(others.rate, 1.0);
    }

    #[test]
    fn test_baseline_recorded() {
        let harness = EvaluationHarness::new(AccuracyThresholds::default()).unwrap();
        let outcome = harness.run(&LabeledDataset::default(), &ClassifierRegistry::default());
        assert_eq!(outcome.baseline, "keyword-score");
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.empty_groups.len(), 4);
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let dataset_path = dir.path().join("labeled.csv");
        let reference_path = dir.path().join("articles.json");
        let results_path = dir.path().join("out").join("results.json");
        let report_path = dir.path().join("report.md");

        std::fs::write(
            &dataset_path,
            "title,category\n\
             5 Best Productivity Tips,listicle\n\
             My Top Ten Movies,listicle\n\
             Released in 2023,other\n\
             Understanding lifetimes,other\n",
        )
        .unwrap();
        std::fs::write(
            &reference_path,
            r#"[{"title": "5 Best Productivity Tips"}, {"title": "My Top Ten Movies"},
                {"title": "Released in 2023"}, {"title": "Understanding lifetimes"},
                {"title": "Not labeled yet"}]"#,
        )
        .unwrap();

        let config = EvaluationConfig {
            dataset_path,
            reference_path: Some(reference_path),
            results_path: results_path.clone(),
            report_path: Some(report_path.clone()),
            baseline: "keyword-score".to_string(),
            thresholds: AccuracyThresholds::default(),
        };
        let pipeline = EvaluationPipeline::new(config);
        let outcome = pipeline.run(&ClassifierRegistry::default()).unwrap();

        let pattern = outcome.results.get("pattern").unwrap();
        assert_eq!(pattern.overall_rate(), 1.0);
        assert!(outcome.passed());

        let report = outcome.report().unwrap();
        pipeline.save_outputs(&outcome, &report).unwrap();

        assert_eq!(RunResults::load(&results_path).unwrap(), outcome.results);
        assert!(std::fs::read_to_string(&report_path).unwrap().contains("| pattern |"));
    }

    #[test]
    fn test_pipeline_integrity_failure() {
        let dir = tempfile::tempdir().unwrap();
        let dataset_path = dir.path().join("labeled.csv");
        let reference_path = dir.path().join("articles.json");
        std::fs::write(&dataset_path, "title,category\nA,other\nB,listicle\n").unwrap();
        std::fs::write(&reference_path, r#"[{"title": "A"}, {"title": "C"}]"#).unwrap();

        let pipeline = EvaluationPipeline::new(EvaluationConfig {
            dataset_path,
            reference_path: Some(reference_path),
            ..EvaluationConfig::default()
        });

        let err = pipeline.run(&ClassifierRegistry::default()).unwrap_err();
        assert!(matches!(err, EvalError::DataIntegrity { row: 1, .. }));
    }

    #[test]
    fn test_pipeline_rejects_mismatched_baseline() {
        let pipeline = EvaluationPipeline::new(EvaluationConfig {
            baseline: "pattern".to_string(),
            ..EvaluationConfig::default()
        });
        let err = pipeline.run(&ClassifierRegistry::default()).unwrap_err();
        assert!(matches!(
            err,
            EvalError::BaselineMismatch { ref configured, ref registered }
                if configured == "pattern" && registered == "keyword-score"
        ));
    }
}
