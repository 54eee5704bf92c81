use std::cmp::Ordering;
use std::fmt;

use crate::error::{EngineError, Result};
use crate::models::{FeedbackRecord, RatingBucket};

/// Exact arithmetic mean of integer scores, kept as a fraction so that
/// rounding and threshold checks never see float drift.
#[derive(Debug, Clone, Copy)]
pub struct Mean {
    sum: u64,
    count: u64,
}

impl Mean {
    pub fn value(&self) -> f64 {
        self.sum as f64 / self.count as f64
    }

    /// Mean in hundredths, rounded half away from zero.
    pub fn hundredths(&self) -> u64 {
        round_ratio(self.sum * 100, self.count)
    }

    /// Compares the 2-decimal rounded value against a threshold.
    pub fn rounded_at_least(&self, threshold: f64) -> bool {
        self.hundredths() as f64 >= (threshold * 100.0).round()
    }

    /// Compares the exact value against a threshold.
    pub fn below(&self, threshold: f64) -> bool {
        self.value() < threshold
    }
}

impl PartialEq for Mean {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Mean {}

impl PartialOrd for Mean {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Mean {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.sum * other.count).cmp(&(other.sum * self.count))
    }
}

impl fmt::Display for Mean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hundredths = self.hundredths();
        write!(f, "{}.{:02}", hundredths / 100, hundredths % 100)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: RatingBucket) -> usize {
        match bucket {
            RatingBucket::Low => self.low,
            RatingBucket::Medium => self.medium,
            RatingBucket::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSummary {
    pub network: String,
    pub count: usize,
    pub mean: Mean,
}

pub fn count(records: &[FeedbackRecord]) -> usize {
    records.len()
}

pub fn average(records: &[FeedbackRecord]) -> Result<Mean> {
    if records.is_empty() {
        return Err(EngineError::EmptyInput);
    }
    let sum = records
        .iter()
        .map(|record| u64::from(record.review_score()))
        .sum();
    Ok(Mean {
        sum,
        count: records.len() as u64,
    })
}

pub fn count_by_bucket(records: &[FeedbackRecord]) -> BucketCounts {
    let mut counts = BucketCounts::default();
    for record in records {
        match record.bucket() {
            RatingBucket::Low => counts.low += 1,
            RatingBucket::Medium => counts.medium += 1,
            RatingBucket::High => counts.high += 1,
        }
    }
    counts
}

pub fn count_with_score(records: &[FeedbackRecord], score: u8) -> usize {
    records
        .iter()
        .filter(|record| record.review_score() == score)
        .count()
}

/// Per-network counts and means, in order of each label's first appearance.
pub fn breakdown_by_network(records: &[FeedbackRecord]) -> Vec<NetworkSummary> {
    let mut groups: Vec<(String, u64, u64)> = Vec::new();

    for record in records {
        let score = u64::from(record.review_score());
        match groups
            .iter_mut()
            .find(|(network, _, _)| network.as_str() == record.network_type())
        {
            Some(entry) => {
                entry.1 += 1;
                entry.2 += score;
            }
            None => groups.push((record.network_type().to_string(), 1, score)),
        }
    }

    groups
        .into_iter()
        .map(|(network, count, sum)| NetworkSummary {
            network,
            count: count as usize,
            mean: Mean { sum, count },
        })
        .collect()
}

/// `100 * part / whole` with one decimal, rounded half away from zero.
/// Returns `None` for an empty whole.
pub fn format_percent(part: usize, whole: usize) -> Option<String> {
    if whole == 0 {
        return None;
    }
    let tenths = round_ratio(part as u64 * 1000, whole as u64);
    Some(format!("{}.{}", tenths / 10, tenths % 10))
}

fn round_ratio(numerator: u64, denominator: u64) -> u64 {
    (2 * numerator + denominator) / (2 * denominator)
}
