//! Net Promoter Score calculation.
//!
//! Pure functions over a snapshot of records. Unscored records are ignored;
//! a score outside [0, 10] is rejected instead of being miscategorized.
//!
//! When nothing is scored, every percentage and the NPS are `0.0` and
//! [`SatisfactionMetrics::has_data`] returns false.

use serde::Serialize;
use thiserror::Error;

use crate::models::{Category, Record};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("record {record_id} has invalid score {score} (expected 0-10)")]
    InvalidScore { record_id: i64, score: f64 },
}

/// Category of a record, `None` if it has not been scored yet.
pub fn classify(record: &Record) -> Result<Option<Category>, MetricsError> {
    match record.score {
        None => Ok(None),
        Some(score) => validate_score(record.id, score).map(|s| Some(Category::from_score(s))),
    }
}

fn validate_score(record_id: i64, score: f64) -> Result<f64, MetricsError> {
    if score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(score)
    } else {
        Err(MetricsError::InvalidScore { record_id, score })
    }
}

/// Category counts and NPS for a set of records.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SatisfactionMetrics {
    pub total_scored: u64,
    pub promoter_count: u64,
    pub neutral_count: u64,
    pub detractor_count: u64,
    pub promoter_pct: f64,
    pub neutral_pct: f64,
    pub detractor_pct: f64,
    /// `promoter_pct - detractor_pct`, always within [-100, 100].
    pub nps_score: f64,
}

impl SatisfactionMetrics {
    /// False when no record was scored (all figures are the zero sentinel).
    pub fn has_data(&self) -> bool {
        self.total_scored > 0
    }

    pub fn count(&self, category: Category) -> u64 {
        match category {
            Category::Promoter => self.promoter_count,
            Category::Neutral => self.neutral_count,
            Category::Detractor => self.detractor_count,
        }
    }

    pub fn percentage(&self, category: Category) -> f64 {
        match category {
            Category::Promoter => self.promoter_pct,
            Category::Neutral => self.neutral_pct,
            Category::Detractor => self.detractor_pct,
        }
    }

    /// Qualitative band for the NPS, `None` without data.
    pub fn rating(&self) -> Option<NpsRating> {
        self.has_data().then(|| NpsRating::from_nps(self.nps_score))
    }
}

/// Compute category counts and NPS.
pub fn compute_metrics<'a, I>(records: I) -> Result<SatisfactionMetrics, MetricsError>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut metrics = SatisfactionMetrics::default();

    for record in records {
        let Some(category) = classify(record)? else {
            continue;
        };
        metrics.total_scored += 1;
        match category {
            Category::Promoter => metrics.promoter_count += 1,
            Category::Neutral => metrics.neutral_count += 1,
            Category::Detractor => metrics.detractor_count += 1,
        }
    }

    if metrics.total_scored > 0 {
        let total = metrics.total_scored as f64;
        metrics.promoter_pct = 100.0 * metrics.promoter_count as f64 / total;
        metrics.neutral_pct = 100.0 * metrics.neutral_count as f64 / total;
        metrics.detractor_pct = 100.0 * metrics.detractor_count as f64 / total;
        metrics.nps_score = metrics.promoter_pct - metrics.detractor_pct;
    }

    Ok(metrics)
}

/// Qualitative reading of an NPS value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NpsRating {
    /// NPS above 50.
    Excellent,
    /// NPS above 0 up to 50.
    Good,
    /// NPS of 0 or below.
    NeedsAttention,
}

impl NpsRating {
    pub fn from_nps(nps: f64) -> Self {
        if nps > 50.0 {
            Self::Excellent
        } else if nps > 0.0 {
            Self::Good
        } else {
            Self::NeedsAttention
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::NeedsAttention => "Needs attention",
        }
    }
}

/// Descriptive statistics over the scored population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Mean/min/max of all set scores, `None` if nothing is scored.
pub fn summarize_scores<'a, I>(records: I) -> Result<Option<ScoreSummary>, MetricsError>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut count = 0u64;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for record in records {
        let Some(score) = record.score else {
            continue;
        };
        let score = validate_score(record.id, score)?;
        count += 1;
        sum += score;
        min = min.min(score);
        max = max.max(score);
    }

    if count == 0 {
        return Ok(None);
    }
    Ok(Some(ScoreSummary {
        mean: sum / count as f64,
        min,
        max,
    }))
}

/// Number of records still waiting for a score.
pub fn pending_count<'a, I>(records: I) -> u64
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().filter(|r| r.is_pending()).count() as u64
}
