use crate::error::{EngineError, Result};
use crate::models::{FeedbackRecord, RatingBucket};

const ALL: &str = "all";

/// Query over a record collection. `None` on any selector means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    pub score: Option<u8>,
    pub network: Option<String>,
    pub rating: Option<RatingBucket>,
}

impl FilterCriteria {
    /// Builds criteria from the string labels a presentation layer holds,
    /// where `"all"` disables a selector.
    pub fn from_labels(search: &str, score: &str, network: &str, rating: &str) -> Result<Self> {
        Ok(Self {
            search: search.to_string(),
            score: parse_score(score)?,
            network: parse_network(network),
            rating: parse_rating(rating)?,
        })
    }

    pub fn matches(&self, record: &FeedbackRecord) -> bool {
        self.matches_search(record)
            && self.score.map_or(true, |score| record.review_score() == score)
            && self
                .network
                .as_deref()
                .map_or(true, |network| record.network_type() == network)
            && self.rating.map_or(true, |bucket| record.bucket() == bucket)
    }

    // Substring, not equality: "2" also matches a score rendered as "12".
    fn matches_search(&self, record: &FeedbackRecord) -> bool {
        record
            .network_type()
            .to_lowercase()
            .contains(&self.search.to_lowercase())
            || record.review_score().to_string().contains(&self.search)
    }
}

pub fn apply(records: &[FeedbackRecord], criteria: &FilterCriteria) -> Vec<FeedbackRecord> {
    records
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect()
}

pub fn parse_score(value: &str) -> Result<Option<u8>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case(ALL) {
        return Ok(None);
    }
    value
        .parse::<u8>()
        .map(Some)
        .map_err(|_| EngineError::InvalidCriteria(format!("score filter '{value}'")))
}

pub fn parse_network(value: &str) -> Option<String> {
    if value.trim().eq_ignore_ascii_case(ALL) {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn parse_rating(value: &str) -> Result<Option<RatingBucket>> {
    if value.trim().eq_ignore_ascii_case(ALL) {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}
