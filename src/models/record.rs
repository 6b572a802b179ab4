//! Customer evaluation records and NPS categories.

use serde::{Deserialize, Serialize};

/// One customer evaluation as stored by the scoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    /// Free-form evaluation text.
    #[serde(rename = "texto_avaliacao")]
    pub text: String,
    /// Sentiment score in [0, 10]; `None` until the service scores it.
    #[serde(rename = "nota_llm", default)]
    pub score: Option<f64>,
}

impl Record {
    /// Create an unscored record.
    pub fn pending(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            score: None,
        }
    }

    /// Create a record that already carries a score.
    pub fn scored(id: i64, text: impl Into<String>, score: f64) -> Self {
        Self {
            id,
            text: text.into(),
            score: Some(score),
        }
    }

    /// A record is pending exactly when it has no score.
    pub fn is_pending(&self) -> bool {
        self.score.is_none()
    }
}

/// NPS category of a scored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Score 9-10.
    Promoter,
    /// Score 7-8.
    Neutral,
    /// Score 0-6.
    Detractor,
}

impl Category {
    /// Categorize a score already known to lie in [0, 10].
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            Self::Promoter
        } else if score >= 7.0 {
            Self::Neutral
        } else {
            Self::Detractor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Promoter => "promoter",
            Self::Neutral => "neutral",
            Self::Detractor => "detractor",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "promoter" => Some(Self::Promoter),
            "neutral" => Some(Self::Neutral),
            "detractor" => Some(Self::Detractor),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
