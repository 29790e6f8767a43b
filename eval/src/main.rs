// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Accuracy evaluation CLI for listicle title classifiers
//!
//! Usage:
//!   eval-accuracy --dataset data/labeled.csv --reference data/articles.json
//!   eval-accuracy --max-false-negative-rate 0.4 --report report.md

use anyhow::{Context, Result};
use clap::Parser;
use listicle_eval::classifiers::ClassifierRegistry;
use listicle_eval::metrics::AccuracyThresholds;
use listicle_eval::pipeline::{EvaluationConfig, EvaluationPipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "eval-accuracy")]
#[command(about = "Evaluate listicle classifiers against a labeled title dataset")]
#[command(version)]
struct Args {
    /// Labeled CSV with `title` and `category` columns
    #[arg(short, long, default_value = "data/labeled.csv")]
    dataset: PathBuf,

    /// Article dump (JSON array with `title`) the labels were produced from
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Results artifact, overwritten on every run
    #[arg(short, long, default_value = "results.json")]
    output: PathBuf,

    /// Also write the comparison report as markdown
    #[arg(long)]
    report: Option<PathBuf>,

    /// Classifier the others are compared against
    #[arg(short, long, default_value = "keyword-score")]
    baseline: String,

    /// Maximum share of other titles flagged as listicles
    #[arg(long, env = "LISTICLE_MAX_FALSE_POSITIVE_RATE", default_value_t = 0.025)]
    max_false_positive_rate: f64,

    /// Maximum share of listicles not flagged
    #[arg(long, env = "LISTICLE_MAX_FALSE_NEGATIVE_RATE", default_value_t = 0.5)]
    max_false_negative_rate: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let thresholds =
        AccuracyThresholds::new(args.max_false_positive_rate, args.max_false_negative_rate)
            .context("Invalid accuracy thresholds")?;

    tracing::info!("Listicle Classifier Accuracy Evaluation");
    tracing::info!("Dataset: {}", args.dataset.display());
    tracing::info!(
        "Thresholds: false-positive <= {}, false-negative <= {}",
        thresholds.false_positive_rate_max,
        thresholds.false_negative_rate_max
    );

    let config = EvaluationConfig {
        dataset_path: args.dataset,
        reference_path: args.reference,
        results_path: args.output,
        report_path: args.report,
        baseline: args.baseline,
        thresholds,
    };

    let registry = ClassifierRegistry::from_builtins(&config.baseline)
        .with_context(|| format!("Cannot use {:?} as baseline", config.baseline))?;

    let pipeline = EvaluationPipeline::new(config);
    let outcome = pipeline.run(&registry).context("Evaluation failed")?;
    let report = outcome.report()?;

    println!("\n{}:\n", report.headline());
    print!("{}", report.render_table());

    if !outcome.empty_groups.is_empty() {
        println!("\nEmpty ground-truth groups (counted as 100%):");
        for (name, kind) in &outcome.empty_groups {
            println!("  {} / {}", name, kind);
        }
    }

    if !outcome.violations.is_empty() {
        println!("\nThreshold violations:");
        for violation in &outcome.violations {
            println!("  {}", violation);
        }
    }

    pipeline
        .save_outputs(&outcome, &report)
        .context("Failed to save evaluation outputs")?;
    println!("\nResults saved to: {}", pipeline.config().results_path.display());
    if let Some(ref report_path) = pipeline.config().report_path {
        println!("Markdown report saved to: {}", report_path.display());
    }

    outcome.ensure_passed()?;

    println!("\nAll thresholds met.");
    Ok(())
}
