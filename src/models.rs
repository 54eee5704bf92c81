use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A single piece of customer feedback. Scores are validated on construction,
/// so every record reaching the engine has a well-defined bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRecord {
    id: String,
    review_score: u8,
    network_type: String,
    ratings_count: u32,
}

impl FeedbackRecord {
    pub fn new(
        id: impl Into<String>,
        review_score: i64,
        network_type: impl Into<String>,
        ratings_count: u32,
    ) -> Result<Self> {
        RatingBucket::from_score(review_score)?;
        Ok(Self {
            id: id.into(),
            review_score: review_score as u8,
            network_type: network_type.into(),
            ratings_count,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn review_score(&self) -> u8 {
        self.review_score
    }

    pub fn network_type(&self) -> &str {
        &self.network_type
    }

    pub fn ratings_count(&self) -> u32 {
        self.ratings_count
    }

    pub fn bucket(&self) -> RatingBucket {
        match self.review_score {
            1 | 2 => RatingBucket::Low,
            3 => RatingBucket::Medium,
            _ => RatingBucket::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingBucket {
    Low,
    Medium,
    High,
}

impl RatingBucket {
    pub fn from_score(score: i64) -> Result<Self> {
        match score {
            1 | 2 => Ok(RatingBucket::Low),
            3 => Ok(RatingBucket::Medium),
            4 | 5 => Ok(RatingBucket::High),
            other => Err(EngineError::InvalidScore(other)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatingBucket::Low => "Low",
            RatingBucket::Medium => "Medium",
            RatingBucket::High => "High",
        }
    }
}

impl fmt::Display for RatingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RatingBucket {
    type Err = EngineError;

    /// Accepts bucket names as well as the dashboard's colour names.
    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" | "red" => Ok(RatingBucket::Low),
            "medium" | "yellow" => Ok(RatingBucket::Medium),
            "high" | "green" => Ok(RatingBucket::High),
            other => Err(EngineError::InvalidCriteria(format!(
                "unknown rating bucket '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeadingLevel {
    H2,
    H3,
}

/// One typed block of a narrative document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Section {
    Heading { level: HeadingLevel, text: String },
    Bold(String),
    Bullet(String),
    Paragraph(String),
    Blank,
}

impl Section {
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Section::Heading {
            level,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryDocument {
    pub sections: Vec<Section>,
}
