// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Baseline-relative comparison report
//!
//! Each classifier gets one row with its overall, listicle and other rates. Rows
//! other than the baseline also show the signed difference to the baseline in
//! percentage points. The baseline row always comes first.

use crate::datasets::Category;
use crate::errors::{EvalError, Result};
use crate::metrics::{error_rate_name, RateSummary, RunResults};
use crate::pipeline::EvaluationOutcome;

/// Misclassified titles listed per classifier/kind in the markdown report
const MAX_LISTED_FAILURES: usize = 25;

/// Deltas smaller than this are shown as zero
const DELTA_EPSILON: f64 = 1e-9;

const HEADER: [&str; 4] = ["Classifier", "All", "Listicles", "Others"];

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub name: String,
    pub is_baseline: bool,
    pub rates: RateSummary,
    /// Difference to the baseline; None for the baseline itself
    pub delta: Option<RateSummary>,
}

impl ReportRow {
    fn label(&self) -> String {
        if self.is_baseline {
            format!("{} (baseline)", self.name)
        } else {
            self.name.clone()
        }
    }

    fn cells(&self) -> [String; 4] {
        let cell = |rate: f64, delta: Option<f64>| match delta {
            Some(d) => format!("{} ({})", format_percent(rate), format_signed_percent(d)),
            None => format_percent(rate),
        };
        [
            self.label(),
            cell(self.rates.all, self.delta.map(|d| d.all)),
            cell(self.rates.listicles, self.delta.map(|d| d.listicles)),
            cell(self.rates.others, self.delta.map(|d| d.others)),
        ]
    }
}

/// Comparison of every classifier against the baseline
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub rows: Vec<ReportRow>,
    pub checked: usize,
    pub listicles: usize,
    pub others: usize,
}

impl ComparisonReport {
    /// Build rows from run results; `baseline` must be present in the results
    pub fn build(results: &RunResults, baseline: &str) -> Result<Self> {
        let base = results
            .get(baseline)
            .ok_or_else(|| EvalError::UnknownClassifier(baseline.to_string()))?;
        let base_rates = base.rates();

        let mut rows = vec![ReportRow {
            name: baseline.to_string(),
            is_baseline: true,
            rates: base_rates,
            delta: None,
        }];

        rows.extend(
            results
                .iter()
                .filter(|(name, _)| *name != baseline)
                .map(|(name, r)| {
                    let rates = r.rates();
                    ReportRow {
                        name: name.to_string(),
                        is_baseline: false,
                        rates,
                        delta: Some(rates.delta(&base_rates)),
                    }
                }),
        );

        Ok(Self {
            rows,
            checked: base.total(),
            listicles: base.listicles.total,
            others: base.others.total,
        })
    }

    pub fn headline(&self) -> String {
        format!(
            "Results (checked {} titles, of which {} listicles and {} other)",
            self.checked, self.listicles, self.others
        )
    }

    /// Fixed-width text table for the terminal
    pub fn render_table(&self) -> String {
        let header = HEADER.map(|h| h.to_string());
        let body: Vec<[String; 4]> = self.rows.iter().map(|r| r.cells()).collect();

        let mut widths = header.clone().map(|h| h.chars().count());
        for cells in &body {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let render_line = |cells: &[String; 4]| {
            cells
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let total_width = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
        let mut table = String::new();
        table.push_str(&render_line(&header));
        table.push('\n');
        table.push_str(&"-".repeat(total_width));
        table.push('\n');
        for cells in &body {
            table.push_str(&render_line(cells));
            table.push('\n');
        }
        table
    }

    /// Markdown report with thresholds, violations and misclassified titles
    pub fn render_markdown(&self, outcome: &EvaluationOutcome) -> String {
        let mut report = String::new();

        report.push_str("# Listicle Classifier Accuracy Report\n\n");
        report.push_str(&format!(
            "**Generated:** {}\n\n",
            outcome.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        report.push_str(&format!("{}.\n\n", self.headline()));

        report.push_str("## Comparison\n\n");
        report.push_str(&format!("| {} |\n", HEADER.join(" | ")));
        report.push_str("|------------|-----|-----------|--------|\n");
        for row in &self.rows {
            report.push_str(&format!("| {} |\n", row.cells().join(" | ")));
        }

        report.push_str("\n## Thresholds\n\n");
        report.push_str(&format!(
            "- Max false-positive rate: {}\n",
            format_percent(outcome.thresholds.false_positive_rate_max)
        ));
        report.push_str(&format!(
            "- Max false-negative rate: {}\n\n",
            format_percent(outcome.thresholds.false_negative_rate_max)
        ));

        if outcome.passed() {
            report.push_str("**Status:** passed\n\n");
        } else {
            report.push_str("**Status:** FAILED\n\n");
            for violation in &outcome.violations {
                report.push_str(&format!("- {}\n", violation));
            }
            report.push('\n');
        }

        if !outcome.empty_groups.is_empty() {
            report.push_str("Empty ground-truth groups (counted as 100%):\n\n");
            for (name, kind) in &outcome.empty_groups {
                report.push_str(&format!("- {} / {}\n", name, kind));
            }
            report.push('\n');
        }

        report.push_str("## Misclassified Titles\n");
        for row in &self.rows {
            let Some(results) = outcome.results.get(&row.name) else {
                continue;
            };
            report.push_str(&format!("\n### {}\n", row.label()));

            for kind in Category::ALL {
                let result = results.kind(kind);
                report.push_str(&format!(
                    "\n{} titles, {} {} ({} of {}):\n\n",
                    kind,
                    error_rate_name(kind),
                    format_percent(result.error_rate()),
                    result.failures.len(),
                    result.total
                ));
                for title in result.failures.iter().take(MAX_LISTED_FAILURES) {
                    report.push_str(&format!("- {}\n", title));
                }
                if result.failures.len() > MAX_LISTED_FAILURES {
                    report.push_str(&format!(
                        "- ... and {} more\n",
                        result.failures.len() - MAX_LISTED_FAILURES
                    ));
                }
            }
        }

        report
    }
}

/// Format a rate in [0, 1] as a percentage with 3 significant digits ("97.5%")
pub fn format_percent(rate: f64) -> String {
    format!("{}%", round_significant(rate * 100.0, 3))
}

/// Like `format_percent`, but always signed ("+2.5%", "-10%", "+0%")
pub fn format_signed_percent(delta: f64) -> String {
    if delta.abs() < DELTA_EPSILON {
        return "+0%".to_string();
    }
    let formatted = format_percent(delta);
    if delta > 0.0 {
        format!("+{}", formatted)
    } else {
        formatted
    }
}

fn round_significant(value: f64, digits: i32) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits - 1 - magnitude).max(0) as usize;
    let formatted = format!("{:.*}", decimals, value);
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{AccuracyThresholds, ClassifierResults, KindResult};
    use crate::pipeline::ThresholdViolation;
    use chrono::Utc;

    fn failures(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("title {}", i)).collect()
    }

    fn results(listicle_misses: usize, other_misses: usize) -> ClassifierResults {
        ClassifierResults {
            listicles: KindResult::from_failures(40, failures(listicle_misses)),
            others: KindResult::from_failures(60, failures(other_misses)),
        }
    }

    fn sample_run() -> RunResults {
        let mut run = RunResults::default();
        run.insert("alpha", results(2, 0));
        run.insert("zeta-baseline", results(10, 3));
        run.insert("middle", results(20, 30));
        run
    }

    fn outcome(run: RunResults, violations: Vec<ThresholdViolation>) -> EvaluationOutcome {
        EvaluationOutcome {
            results: run,
            baseline: "zeta-baseline".to_string(),
            thresholds: AccuracyThresholds::default(),
            violations,
            empty_groups: vec![],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(1.0), "100%");
        assert_eq!(format_percent(0.975), "97.5%");
        assert_eq!(format_percent(0.5), "50%");
        assert_eq!(format_percent(1.0 / 3.0), "33.3%");
        assert_eq!(format_percent(0.03333), "3.33%");
        assert_eq!(format_percent(0.0), "0%");
        assert_eq!(format_percent(0.9996), "100%");
    }

    #[test]
    fn test_format_signed_percent() {
        assert_eq!(format_signed_percent(0.025), "+2.5%");
        assert_eq!(format_signed_percent(-0.1), "-10%");
        assert_eq!(format_signed_percent(0.0), "+0%");
        assert_eq!(format_signed_percent(1e-15), "+0%");
    }

    #[test]
    fn test_baseline_row_first() {
        let report = ComparisonReport::build(&sample_run(), "zeta-baseline").unwrap();

        let names: Vec<_> = report.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["zeta-baseline", "alpha", "middle"]);
        assert!(report.rows[0].is_baseline);
        assert!(report.rows[0].delta.is_none());
        assert_eq!((report.checked, report.listicles, report.others), (100, 40, 60));
    }

    #[test]
    fn test_deltas_against_baseline() {
        let report = ComparisonReport::build(&sample_run(), "zeta-baseline").unwrap();
        let alpha = &report.rows[1];
        let delta = alpha.delta.unwrap();

        // alpha: 98/100, 38/40, 60/60; baseline: 87/100, 30/40, 57/60
        assert!((delta.all - 0.11).abs() < 1e-12);
        assert!((delta.listicles - 0.2).abs() < 1e-12);
        assert!((delta.others - 0.05).abs() < 1e-12);

        assert_eq!(
            alpha.cells(),
            [
                "alpha".to_string(),
                "98% (+11%)".to_string(),
                "95% (+20%)".to_string(),
                "100% (+5%)".to_string()
            ]
        );
    }

    #[test]
    fn test_unknown_baseline() {
        let err = ComparisonReport::build(&sample_run(), "missing").unwrap_err();
        assert!(matches!(err, EvalError::UnknownClassifier(_)));
    }

    #[test]
    fn test_render_table() {
        let report = ComparisonReport::build(&sample_run(), "zeta-baseline").unwrap();
        let table = report.render_table();
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Classifier"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert!(lines[2].starts_with("zeta-baseline (baseline)"));
        assert!(lines[3].starts_with("alpha"));
        assert!(lines[4].contains("(-"));
    }

    #[test]
    fn test_render_markdown() {
        let run = sample_run();
        let report = ComparisonReport::build(&run, "zeta-baseline").unwrap();

        let passed = report.render_markdown(&outcome(run.clone(), vec![]));
        assert!(passed.contains("# Listicle Classifier Accuracy Report"));
        assert!(passed.contains("| zeta-baseline (baseline) | 87% | 75% | 95% |"));
        assert!(passed.contains("**Status:** passed"));
        assert!(passed.contains("- ... and 5 more"));

        let violation = ThresholdViolation {
            classifier: "middle".to_string(),
            kind: Category::Other,
            error_rate: 0.5,
            max: 0.025,
        };
        let failed = report.render_markdown(&outcome(run, vec![violation]));
        assert!(failed.contains("**Status:** FAILED"));
        assert!(failed.contains("middle / other: false-positive rate 50.00% exceeds 2.50%"));
    }
}
