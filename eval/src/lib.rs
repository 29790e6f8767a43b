// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Accuracy evaluation for listicle title classifiers
//!
//! This crate provides:
//! - The listicle title pattern (count token after a title/subtitle anchor)
//! - Labeled dataset loading with a reference-title integrity check
//! - A classifier registry with a designated baseline
//! - Per-kind accuracy tallies and false-positive / false-negative thresholds
//! - A baseline-relative comparison report and a JSON results artifact

pub mod classifiers;
pub mod datasets;
pub mod errors;
pub mod metrics;
pub mod pattern;
pub mod pipeline;
pub mod report;

pub use classifiers::{
    ClassifierRegistry, FnClassifier, KeywordScoreBaseline, PatternClassifier, TitleClassifier,
};
pub use datasets::{Category, LabeledDataset, LabeledTitle};
pub use errors::{EvalError, Result};
pub use metrics::{AccuracyThresholds, ClassifierResults, KindResult, RunResults};
pub use pattern::{find_listicle_match, is_listicle_like, ListicleMatch};
pub use pipeline::{EvaluationConfig, EvaluationHarness, EvaluationOutcome, EvaluationPipeline};
pub use report::ComparisonReport;
