// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Error types for dataset loading, classifier registration and evaluation runs

use std::path::PathBuf;

/// Errors raised by the evaluation library
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Labeled dataset disagrees with the reference titles it was labeled from
    #[error(
        "labeled title at row {row} does not match the reference source: \
         expected {expected:?}, found {found:?}"
    )]
    DataIntegrity {
        row: usize,
        expected: String,
        found: String,
    },

    /// Reference source has fewer titles than the labeled dataset
    #[error("reference source has {reference} titles but the labeled dataset has {labeled}")]
    ReferenceTooShort { labeled: usize, reference: usize },

    /// One or more classifiers exceeded their allowed error rate
    #[error("{count} threshold violation(s): {summary}")]
    ThresholdViolations { count: usize, summary: String },

    /// Threshold configuration outside of [0, 1]
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    /// Two classifiers registered under the same name
    #[error("classifier {0:?} is registered more than once")]
    DuplicateClassifier(String),

    /// Requested classifier is not registered
    #[error("unknown classifier {0:?}")]
    UnknownClassifier(String),

    /// Configured baseline is not the registry's baseline
    #[error(
        "configured baseline {configured:?} does not match the registry baseline {registered:?}"
    )]
    BaselineMismatch { configured: String, registered: String },

    /// Category column holds something other than listicle/other
    #[error("row {row}: unknown category {value:?} (expected \"listicle\" or \"other\")")]
    UnknownCategory { row: usize, value: String },

    #[error("failed to read CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl EvalError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
