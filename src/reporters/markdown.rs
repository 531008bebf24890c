//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Useful for journaling a result or pasting it into a note.

use super::ResultReport;
use crate::models::BrainType;
use anyhow::Result;
use chrono::Local;

/// Width of the balance bar in characters
const BAR_WIDTH: usize = 20;

/// Render report as GitHub-flavored Markdown
pub fn render(report: &ResultReport) -> Result<String> {
    let mut md = String::new();

    md.push_str(&render_header(report));
    md.push('\n');

    md.push_str(&render_balance(report));
    md.push('\n');

    md.push_str(&render_insights(report));
    md.push('\n');

    md.push_str(&render_strategies(report));
    md.push('\n');

    md.push_str(&render_action(report));
    md.push('\n');

    md.push_str(&render_footer());

    Ok(md)
}

fn render_header(report: &ResultReport) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    format!(
        r#"# {} Brain Type: {} ({})

> {}

**Name:** {} | Generated: {}
"#,
        type_emoji(report.primary.brain_type),
        report.primary.name,
        report.primary.english_name,
        report.primary.description,
        report.display_name,
        timestamp
    )
}

fn render_balance(report: &ResultReport) -> String {
    let mut md = String::from("## C.O.D.E Balance\n\n| Type | Score | Balance |\n|------|-------|---------|\n");
    let n = report.question_count.max(1);
    for (brain_type, count) in report.tally.iter() {
        let filled = count * BAR_WIDTH / n;
        md.push_str(&format!(
            "| {} {} | {}/{} | `{}{}` |\n",
            type_emoji(brain_type),
            capitalize(brain_type.as_str()),
            count,
            report.question_count,
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH - filled)
        ));
    }
    md
}

fn render_insights(report: &ResultReport) -> String {
    let chemistry = &report.primary.chemistry;
    format!(
        r#"## Insights

### Secondary engine: {}

{}

### Best chemistry: {}

_{}_

### Blind spot

{}
"#,
        report.secondary_name,
        report.secondary_line(),
        chemistry.partner,
        chemistry.synergy,
        report.primary.blind_spot
    )
}

fn render_strategies(report: &ResultReport) -> String {
    let mut md = String::from("## Brain Master Strategies\n");
    for (title, list) in report.strategies() {
        md.push_str(&format!("\n### {}\n\n", title));
        if list.is_empty() {
            md.push_str("_No strategies listed._\n");
            continue;
        }
        for (i, item) in list.iter().enumerate() {
            md.push_str(&format!("{}. {}\n", i + 1, item));
        }
    }
    md
}

fn render_action(report: &ResultReport) -> String {
    let mut md = format!(
        "## Recommended Action\n\n{}\n",
        report.primary.recommended_action
    );
    if let Some(commitment) = &report.commitment {
        md.push_str(&format!("\n**My commitment:** {}\n", commitment));
    }
    md
}

fn render_footer() -> String {
    r#"---

*Generated by braintype - C.O.D.E Brain Type Diagnosis*
"#
    .to_string()
}

fn type_emoji(brain_type: BrainType) -> &'static str {
    match brain_type {
        BrainType::Cheetah => "🐆",
        BrainType::Owl => "🦉",
        BrainType::Dolphin => "🐬",
        BrainType::Elephant => "🐘",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_markdown_render_has_header() {
        let report = test_report();
        let md = render(&report).unwrap();
        assert!(md.contains("# 🐆 Brain Type: The Cheetah (CHEETAH)"));
        assert!(md.contains("**Name:** Lee"));
    }

    #[test]
    fn test_markdown_balance_table() {
        let md = render(&test_report()).unwrap();
        assert!(md.contains("| 🐆 Cheetah | 3/5 |"));
        assert!(md.contains("| 🐘 Elephant | 0/5 |"));
    }

    #[test]
    fn test_markdown_commitment_only_when_set() {
        let report = test_report();
        assert!(!render(&report).unwrap().contains("My commitment"));

        let md = render(&report.with_commitment("Practice daily")).unwrap();
        assert!(md.contains("**My commitment:** Practice daily"));
    }

    #[test]
    fn test_markdown_has_strategy_sections() {
        let md = render(&test_report()).unwrap();
        assert!(md.contains("### Read smarter"));
        assert!(md.contains("### Remember more"));
        assert!(md.contains("### Decide wisely"));
    }
}
