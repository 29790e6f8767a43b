// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Ad-hoc title classifier
//!
//! Runs the built-in classifiers over titles given as arguments, or one title
//! per stdin line when no arguments are given.

use anyhow::{bail, Context, Result};
use clap::Parser;
use listicle_eval::classifiers::{builtin_classifiers, TitleClassifier};
use listicle_eval::pattern::find_listicle_match;
use std::io::BufRead;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "classify-titles")]
#[command(about = "Classify titles as listicle or other")]
#[command(version)]
struct Args {
    /// Titles to classify (reads stdin lines if empty)
    titles: Vec<String>,

    /// Only run this classifier
    #[arg(short, long)]
    classifier: Option<String>,

    /// Show which anchor and count token the pattern matched
    #[arg(short, long)]
    explain: bool,

    /// List available classifiers
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.list {
        println!("Available classifiers:");
        println!("----------------------");
        for classifier in builtin_classifiers() {
            println!("  {}: {}", classifier.name(), classifier.description());
        }
        return Ok(());
    }

    let classifiers: Vec<Box<dyn TitleClassifier>> = builtin_classifiers()
        .into_iter()
        .filter(|c| args.classifier.as_deref().map_or(true, |name| c.name() == name))
        .collect();
    if classifiers.is_empty() {
        bail!(
            "Unknown classifier {:?} (see --list)",
            args.classifier.unwrap_or_default()
        );
    }

    let titles = if args.titles.is_empty() {
        tracing::debug!("Reading titles from stdin");
        std::io::stdin()
            .lock()
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .context("Failed to read titles from stdin")?
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect()
    } else {
        args.titles
    };

    let name_width = classifiers.iter().map(|c| c.name().len()).max().unwrap_or(0);

    for title in &titles {
        println!("{}", title);
        for classifier in &classifiers {
            let verdict = if classifier.classify(title) { "listicle" } else { "other" };
            println!("  {:<width$}  {}", classifier.name(), verdict, width = name_width);
        }

        if args.explain {
            match find_listicle_match(title) {
                Some(m) => println!("  match: {}", m),
                None => println!("  match: none"),
            }
        }
    }

    Ok(())
}
