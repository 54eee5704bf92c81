use std::fmt::Write;

use crate::models::{FeedbackRecord, HeadingLevel, Section, SummaryDocument};
use crate::stats::{self, NetworkSummary};

pub const DEFAULT_TOPIC: &str = "Network Feedback";

pub const NO_DATA: &str = "No data available to generate summary. Please adjust your filters to include more feedback entries.";

/// Builds the narrative for a filtered record set. Pure: the same input
/// always yields the same document.
pub fn compile(records: &[FeedbackRecord], topic: Option<&str>) -> SummaryDocument {
    let Ok(mean) = stats::average(records) else {
        return SummaryDocument {
            sections: vec![Section::Paragraph(NO_DATA.to_string())],
        };
    };

    let total = stats::count(records);
    let buckets = stats::count_by_bucket(records);
    let (positive, neutral, negative) = (buckets.high, buckets.medium, buckets.low);
    let breakdown = stats::breakdown_by_network(records);
    // total > 0 once the average exists
    let percent = |part: usize| stats::format_percent(part, total).unwrap_or_default();
    let topic = topic
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .unwrap_or(DEFAULT_TOPIC);

    let mut sections = vec![
        Section::heading(HeadingLevel::H2, topic),
        Section::Blank,
        Section::Bold(format!("Analysis of {total} feedback entries")),
        Section::Blank,
        Section::heading(HeadingLevel::H3, "Overall Performance"),
    ];

    let tier = if mean.rounded_at_least(4.0) {
        "This indicates strong customer satisfaction across the analyzed feedback."
    } else if mean.rounded_at_least(3.0) {
        "This suggests moderate satisfaction with room for improvement."
    } else {
        "This indicates significant concerns that require immediate attention."
    };
    sections.push(Section::Paragraph(format!(
        "The filtered dataset shows an average rating of {mean} out of 5.0, with a satisfaction rate of {}%. {tier}",
        percent(positive)
    )));
    sections.push(Section::Blank);

    sections.push(Section::heading(HeadingLevel::H3, "Key Findings"));
    sections.push(Section::Blank);
    sections.push(Section::Bold("Sentiment Breakdown:".to_string()));
    for (label, count) in [
        ("Positive ratings (4-5 stars)", positive),
        ("Neutral ratings (3 stars)", neutral),
        ("Negative ratings (1-2 stars)", negative),
    ] {
        sections.push(Section::Bullet(format!(
            "{label}: {count} entries ({}%)",
            percent(count)
        )));
    }
    sections.push(Section::Blank);

    if let (Some(dominant), Some(best)) = (most_reviewed(&breakdown), best_rated(&breakdown)) {
        sections.push(Section::Bold("Network Analysis:".to_string()));
        sections.push(Section::Bullet(format!(
            "Most feedback received from {} network ({} entries)",
            dominant.network, dominant.count
        )));
        sections.push(Section::Bullet(format!(
            "Highest performing network: {} with average rating of {}",
            best.network, best.mean
        )));
        sections.push(Section::Blank);
    }

    sections.push(Section::heading(HeadingLevel::H3, "Main Issues Identified"));
    if negative * 10 > total * 3 {
        sections.push(Section::Bullet(format!(
            "High volume of negative feedback ({negative} entries) indicates systemic issues requiring immediate investigation"
        )));
    }
    if negative > 0 {
        sections.push(Section::Bullet(format!(
            "{negative} users reported low satisfaction levels (1-2 stars)"
        )));
    }
    let struggling: Vec<&str> = breakdown
        .iter()
        .filter(|summary| summary.mean.below(3.0))
        .map(|summary| summary.network.as_str())
        .collect();
    if !struggling.is_empty() {
        sections.push(Section::Bullet(format!(
            "Networks requiring attention: {}",
            struggling.join(", ")
        )));
    }
    sections.push(Section::Blank);

    sections.push(Section::heading(HeadingLevel::H3, "Recommendations"));
    if !mean.rounded_at_least(3.5) {
        sections.push(Section::Bullet(
            "Priority: Address root causes of low ratings through detailed user research".to_string(),
        ));
        sections.push(Section::Bullet(
            "Implement immediate quality improvements for underperforming networks".to_string(),
        ));
    }
    sections.push(Section::Bullet(
        "Continue monitoring feedback trends to identify emerging patterns".to_string(),
    ));
    sections.push(Section::Bullet(
        "Focus on converting neutral ratings to positive through targeted improvements".to_string(),
    ));
    if positive * 2 > total {
        sections.push(Section::Bullet(
            "Leverage positive feedback to identify and replicate best practices".to_string(),
        ));
    }

    SummaryDocument { sections }
}

// Ties keep the earlier network: only a strictly larger value replaces it.
fn most_reviewed(breakdown: &[NetworkSummary]) -> Option<&NetworkSummary> {
    breakdown.iter().fold(None, |best, summary| match best {
        Some(current) if current.count >= summary.count => Some(current),
        _ => Some(summary),
    })
}

fn best_rated(breakdown: &[NetworkSummary]) -> Option<&NetworkSummary> {
    breakdown.iter().fold(None, |best, summary| match best {
        Some(current) if current.mean >= summary.mean => Some(current),
        _ => Some(summary),
    })
}

/// Serializes a document to the line markup understood by
/// [`crate::render::render`].
pub fn to_markup(document: &SummaryDocument) -> String {
    let mut output = String::new();

    for section in &document.sections {
        let _ = match section {
            Section::Heading {
                level: HeadingLevel::H2,
                text,
            } => writeln!(output, "## {text}"),
            Section::Heading {
                level: HeadingLevel::H3,
                text,
            } => writeln!(output, "### {text}"),
            Section::Bold(text) => writeln!(output, "**{text}**"),
            Section::Bullet(text) => writeln!(output, "• {text}"),
            Section::Paragraph(text) => writeln!(output, "{text}"),
            Section::Blank => writeln!(output),
        };
    }

    output
}
