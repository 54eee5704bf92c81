use crate::error::{EngineError, Result};
use crate::models::FeedbackRecord;
use crate::stats;

pub const FALLBACK_REPLY: &str = "I can help you with questions about average scores, network types (WiFi, 5G, LTE), rating distributions, and more. What would you like to know?";

pub const GREETING: &str = "Hi! I can help you analyze the feedback data. Try asking me about ratings, network types, or trends!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Average,
    Total,
    Network(&'static str),
    Negative,
    Positive,
    Neutral,
    Best,
    Help,
}

/// A table row. An empty keyword list matches every query.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub keywords: &'static [&'static str],
    pub intent: Intent,
}

impl Rule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.is_empty() || self.keywords.iter().any(|kw| lowered.contains(kw))
    }
}

// Checked in order against the lowercased query; the first match answers.
pub const RULES: &[Rule] = &[
    Rule {
        keywords: &["average", "avg"],
        intent: Intent::Average,
    },
    Rule {
        keywords: &["total", "how many"],
        intent: Intent::Total,
    },
    Rule {
        keywords: &["wifi"],
        intent: Intent::Network("WiFi"),
    },
    Rule {
        keywords: &["5g"],
        intent: Intent::Network("5G"),
    },
    Rule {
        keywords: &["lte"],
        intent: Intent::Network("LTE"),
    },
    Rule {
        keywords: &["low", "red", "negative"],
        intent: Intent::Negative,
    },
    Rule {
        keywords: &["high", "green", "positive"],
        intent: Intent::Positive,
    },
    Rule {
        keywords: &["yellow", "neutral"],
        intent: Intent::Neutral,
    },
    Rule {
        keywords: &["best", "highest"],
        intent: Intent::Best,
    },
    Rule {
        keywords: &[],
        intent: Intent::Help,
    },
];

pub fn classify(query: &str) -> Result<Intent> {
    classify_with(RULES, query)
}

pub fn classify_with(rules: &[Rule], query: &str) -> Result<Intent> {
    let lowered = query.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.intent)
        .ok_or(EngineError::NoMatchingRule)
}

/// Answers `query` from the full, unfiltered dataset.
pub fn respond(query: &str, records: &[FeedbackRecord]) -> Result<String> {
    let intent = classify(query)?;
    Ok(answer(intent, records))
}

pub fn answer(intent: Intent, records: &[FeedbackRecord]) -> String {
    match intent {
        Intent::Average => match stats::average(records) {
            Ok(mean) => format!("The average review score is {mean} out of 5."),
            Err(_) => "There are no feedback entries to average yet.".to_string(),
        },
        Intent::Total => format!(
            "There are {} total feedback entries in the system.",
            stats::count(records)
        ),
        Intent::Network(network) => {
            let subset: Vec<FeedbackRecord> = records
                .iter()
                .filter(|record| record.network_type() == network)
                .cloned()
                .collect();
            match stats::average(&subset) {
                Ok(mean) => format!(
                    "There are {} {network} feedback entries with an average score of {mean}.",
                    subset.len()
                ),
                Err(_) => format!("There are 0 {network} feedback entries."),
            }
        }
        Intent::Negative => format!(
            "There are {} negative ratings (1-2 stars) marked in red.",
            stats::count_by_bucket(records).low
        ),
        Intent::Positive => format!(
            "There are {} positive ratings (4-5 stars) marked in green.",
            stats::count_by_bucket(records).high
        ),
        Intent::Neutral => format!(
            "There are {} neutral ratings (3 stars) marked in yellow.",
            stats::count_by_bucket(records).medium
        ),
        Intent::Best => format!(
            "There are {} entries with the highest rating of 5 stars.",
            stats::count_with_score(records, 5)
        ),
        Intent::Help => FALLBACK_REPLY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sample_records;

    fn ask(query: &str) -> String {
        respond(query, &sample_records()).unwrap()
    }

    #[test]
    fn first_matching_rule_wins() {
        assert_eq!(classify("What is the WiFi average?").unwrap(), Intent::Average);
        assert_eq!(ask("wifi average"), "The average review score is 3.40 out of 5.");
        // "how many" beats "lte"
        assert_eq!(classify("how many LTE entries").unwrap(), Intent::Total);
        // "5g" beats "negative"
        assert_eq!(classify("negative 5G").unwrap(), Intent::Network("5G"));
    }

    #[test]
    fn answers_cover_each_topic() {
        assert_eq!(ask("TOTAL please"), "There are 10 total feedback entries in the system.");
        assert_eq!(
            ask("tell me about wifi"),
            "There are 4 WiFi feedback entries with an average score of 3.75."
        );
        assert_eq!(
            ask("5g?"),
            "There are 3 5G feedback entries with an average score of 2.67."
        );
        assert_eq!(
            ask("lte"),
            "There are 3 LTE feedback entries with an average score of 3.67."
        );
        assert_eq!(ask("red ones"), "There are 3 negative ratings (1-2 stars) marked in red.");
        assert_eq!(ask("green"), "There are 5 positive ratings (4-5 stars) marked in green.");
        assert_eq!(ask("neutral"), "There are 2 neutral ratings (3 stars) marked in yellow.");
        assert_eq!(ask("best"), "There are 3 entries with the highest rating of 5 stars.");
    }

    #[test]
    fn keyword_inside_another_word_still_matches() {
        // "slow" contains "low"
        assert_eq!(classify("why is it slow").unwrap(), Intent::Negative);
        // "highest" contains "high", which comes first
        assert_eq!(classify("highest").unwrap(), Intent::Positive);
    }

    #[test]
    fn unknown_query_gets_help_text() {
        assert_eq!(ask("xyz"), FALLBACK_REPLY);
    }

    #[test]
    fn exhausted_table_is_a_named_error() {
        let rules = &RULES[..RULES.len() - 1];
        assert!(matches!(
            classify_with(rules, "xyz"),
            Err(EngineError::NoMatchingRule)
        ));
    }

    #[test]
    fn empty_dataset_does_not_divide_by_zero() {
        assert_eq!(
            respond("avg", &[]).unwrap(),
            "There are no feedback entries to average yet."
        );
        assert_eq!(respond("wifi", &[]).unwrap(), "There are 0 WiFi feedback entries.");
    }
}
