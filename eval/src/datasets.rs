// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Labeled title datasets for listicle classification evaluation

use crate::errors::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Ground-truth category of a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// "7 Tips for ..." style article
    Listicle,
    /// Anything else
    Other,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Listicle, Category::Other];

    /// Parse the CSV representation (case-insensitive, surrounding whitespace ignored)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "listicle" => Some(Category::Listicle),
            "other" => Some(Category::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Listicle => "listicle",
            Category::Other => "other",
        }
    }

    /// Prediction a correct classifier makes for titles of this category
    pub fn expected_prediction(&self) -> bool {
        matches!(self, Category::Listicle)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single labeled title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledTitle {
    pub title: String,
    pub category: Category,
}

impl LabeledTitle {
    pub fn new(title: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            category,
        }
    }
}

/// Raw CSV row; extra columns are ignored
#[derive(Debug, Deserialize)]
struct LabeledRow {
    title: String,
    category: String,
}

/// Entry of the raw article dump the labels were produced from
#[derive(Debug, Deserialize)]
struct ReferenceArticle {
    title: String,
}

/// Titles grouped by ground truth, in dataset order
#[derive(Debug, Clone, Default)]
pub struct Partition<'a> {
    pub listicles: Vec<&'a str>,
    pub others: Vec<&'a str>,
}

impl<'a> Partition<'a> {
    pub fn group(&self, category: Category) -> &[&'a str] {
        match category {
            Category::Listicle => &self.listicles,
            Category::Other => &self.others,
        }
    }
}

/// A loaded labeled dataset; row order is canonical
#[derive(Debug, Clone, Default)]
pub struct LabeledDataset {
    titles: Vec<LabeledTitle>,
}

impl LabeledDataset {
    pub fn new(titles: Vec<LabeledTitle>) -> Self {
        Self { titles }
    }

    /// Load a CSV file with `title` and `category` columns
    pub fn load_csv(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| EvalError::io(path, e))?;
        let dataset = Self::from_reader(file)?;
        tracing::info!("Loaded {} labeled titles from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Parse CSV data with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let mut titles = Vec::new();
        for (idx, row) in reader.deserialize::<LabeledRow>().enumerate() {
            let row = row?;
            let category = Category::parse(&row.category).ok_or_else(|| EvalError::UnknownCategory {
                row: idx,
                value: row.category.clone(),
            })?;
            titles.push(LabeledTitle {
                title: row.title,
                category,
            });
        }

        Ok(Self { titles })
    }

    pub fn titles(&self) -> &[LabeledTitle] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Split titles by ground truth, preserving dataset order within each group
    pub fn partition(&self) -> Partition<'_> {
        let mut partition = Partition::default();
        for labeled in &self.titles {
            match labeled.category {
                Category::Listicle => partition.listicles.push(&labeled.title),
                Category::Other => partition.others.push(&labeled.title),
            }
        }
        partition
    }

    pub fn label_distribution(&self) -> HashMap<Category, usize> {
        let mut dist = HashMap::new();
        for labeled in &self.titles {
            *dist.entry(labeled.category).or_insert(0) += 1;
        }
        dist
    }

    /// Check that the labeled titles are the first rows of the reference source.
    ///
    /// A mismatch means the labels were produced from a different article dump
    /// (stale or corrupted data), so nothing should be evaluated.
    pub fn verify_against_reference(&self, reference: &[String]) -> Result<()> {
        if reference.len() < self.titles.len() {
            return Err(EvalError::ReferenceTooShort {
                labeled: self.titles.len(),
                reference: reference.len(),
            });
        }

        for (row, (labeled, expected)) in self.titles.iter().zip(reference).enumerate() {
            if labeled.title != *expected {
                return Err(EvalError::DataIntegrity {
                    row,
                    expected: expected.clone(),
                    found: labeled.title.clone(),
                });
            }
        }

        tracing::debug!("All {} labeled titles match the reference source", self.titles.len());
        Ok(())
    }
}

/// Load titles from a JSON array of article objects
pub fn load_reference_titles(path: &Path) -> Result<Vec<String>> {
    let data = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    let articles: Vec<ReferenceArticle> = serde_json::from_str(&data)?;
    Ok(articles.into_iter().map(|a| a.title).collect())
}
