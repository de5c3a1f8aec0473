use crate::libmunje::munje::Question;
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read question data: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed question JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The full, immutable question collection plus the label catalogs derived
/// from it. Built once at startup; never mutated afterwards.
#[derive(Debug)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn from_path(path: &Path) -> Result<QuestionBank, Error> {
        let now = Instant::now();
        let json = std::fs::read_to_string(path)?;
        let bank = Self::from_json(&json)?;
        debug!(
            "[Bank] Loaded {} questions from {:?} in {} ms.",
            bank.len(),
            path,
            now.elapsed().as_millis()
        );
        Ok(bank)
    }

    pub fn from_json(json: &str) -> Result<QuestionBank, Error> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        let bank = QuestionBank { questions };
        for id in bank.duplicate_ids() {
            warn!("[Bank] Duplicate question id {} in the artifact!", id);
        }
        info!("[Bank] {} questions loaded.", bank.len());
        Ok(bank)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(Question::points_or_zero).sum()
    }

    /// Ids that occur more than once, each reported once, in first-appearance
    /// order. The loader only warns about these; `geomjeungja` fails on them.
    pub fn duplicate_ids(&self) -> Vec<i64> {
        let mut seen = HashSet::new();
        let mut dupes = Vec::new();
        for q in &self.questions {
            if !seen.insert(q.id) && !dupes.contains(&q.id) {
                dupes.push(q.id);
            }
        }
        dupes
    }

    /// Distinct module labels in first-appearance order.
    pub fn modules(&self) -> Vec<String> {
        distinct(self.questions.iter().map(|q| q.module.as_str()))
    }

    /// Distinct difficulty labels in first-appearance order; questions without
    /// one contribute nothing.
    pub fn difficulties(&self) -> Vec<String> {
        distinct(self.questions.iter().filter_map(|q| q.difficulty.as_deref()))
    }

    pub fn sections(&self) -> Vec<String> {
        distinct(self.questions.iter().map(|q| q.section.as_str()))
    }

    /// Compares the overview table's grand totals with the loaded collection.
    /// The table counts planned questions, so drift is reportable rather than
    /// a broken artifact.
    pub fn check_overview(&self, overview: &[CategoryOverview]) -> TableCheck {
        let table_questions: u32 = overview.iter().map(|c| c.total_questions).sum();
        let table_points: u32 = overview.iter().map(|c| c.total_points).sum();
        if table_questions as usize == self.len() && table_points == self.total_points() {
            TableCheck::Match {
                questions: table_questions,
                points: table_points,
            }
        } else {
            TableCheck::Drift {
                table_questions,
                table_points,
                actual_questions: self.len(),
                actual_points: self.total_points(),
            }
        }
    }

    /// Distinct point values, ascending.
    pub fn point_values(&self) -> Vec<u32> {
        let mut values: Vec<u32> = Vec::new();
        for q in &self.questions {
            if let Some(p) = q.points {
                if !values.contains(&p) {
                    values.push(p);
                }
            }
        }
        values.sort_unstable();
        values
    }
}

fn distinct<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        if !out.iter().any(|l| l == label) {
            out.push(label.to_string());
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCheck {
    Match {
        questions: u32,
        points: u32,
    },
    Drift {
        table_questions: u32,
        table_points: u32,
        actual_questions: usize,
        actual_points: u32,
    },
}

/// One row of the category-overview table (the second JSON artifact).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOverview {
    pub category: String,
    pub total_questions: u32,
    pub total_points: u32,
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub name: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub related_questions: Vec<String>,
}

pub fn load_overview(path: &Path) -> Result<Vec<CategoryOverview>, Error> {
    let json = std::fs::read_to_string(path)?;
    let overview: Vec<CategoryOverview> = serde_json::from_str(&json)?;
    debug!("[Bank] Loaded overview table ({} categories).", overview.len());
    Ok(overview)
}
