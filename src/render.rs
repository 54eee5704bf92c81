use crate::models::{HeadingLevel, Section};

const H3_MARKER: &str = "###";
const H2_MARKER: &str = "##";
const BOLD_MARKER: &str = "**";
const BULLET_MARKER: &str = "•";

pub fn render(markup: &str) -> Vec<Section> {
    markup.lines().map(render_line).collect()
}

pub fn render_lines<S: AsRef<str>>(lines: &[S]) -> Vec<Section> {
    lines.iter().map(|line| render_line(line.as_ref())).collect()
}

pub fn render_line(line: &str) -> Section {
    if let Some(rest) = line.strip_prefix(H3_MARKER) {
        Section::heading(HeadingLevel::H3, strip_space(rest))
    } else if let Some(rest) = line.strip_prefix(H2_MARKER) {
        Section::heading(HeadingLevel::H2, strip_space(rest))
    } else if is_bold(line) {
        Section::Bold(line.replace(BOLD_MARKER, ""))
    } else if let Some(rest) = line.strip_prefix(BULLET_MARKER) {
        Section::Bullet(strip_space(rest).to_string())
    } else if !line.trim().is_empty() {
        Section::Paragraph(line.to_string())
    } else {
        Section::Blank
    }
}

fn is_bold(line: &str) -> bool {
    line.len() >= 2 * BOLD_MARKER.len()
        && line.starts_with(BOLD_MARKER)
        && line.ends_with(BOLD_MARKER)
}

fn strip_space(rest: &str) -> &str {
    rest.strip_prefix(' ').unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_are_not_shadowed() {
        assert_eq!(
            render_line("### Key Findings"),
            Section::heading(HeadingLevel::H3, "Key Findings")
        );
        assert_eq!(
            render_line("## Network Feedback"),
            Section::heading(HeadingLevel::H2, "Network Feedback")
        );
    }

    #[test]
    fn classifies_each_block_kind() {
        let markup = "**Sentiment Breakdown:**\n• Positive: 2\n\nPlain text\n   \n**not bold";
        assert_eq!(
            render(markup),
            vec![
                Section::Bold("Sentiment Breakdown:".to_string()),
                Section::Bullet("Positive: 2".to_string()),
                Section::Blank,
                Section::Paragraph("Plain text".to_string()),
                Section::Blank,
                Section::Paragraph("**not bold".to_string()),
            ]
        );
    }

    #[test]
    fn bare_marker_pair_is_empty_bold() {
        assert_eq!(render_line("**"), Section::Paragraph("**".to_string()));
        assert_eq!(render_line("****"), Section::Bold(String::new()));
    }

    #[test]
    fn render_lines_accepts_owned_strings() {
        let lines = vec!["## Title".to_string(), String::new()];
        assert_eq!(
            render_lines(&lines),
            vec![Section::heading(HeadingLevel::H2, "Title"), Section::Blank]
        );
    }
}
