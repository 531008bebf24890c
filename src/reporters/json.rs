//! JSON reporter
//!
//! Outputs the full ResultReport as pretty-printed JSON.
//! Useful for machine consumption or piping to jq.

use super::ResultReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &ResultReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_json_render_valid() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["display_name"], "Lee");
        assert_eq!(parsed["primary"]["brain_type"], "cheetah");
        assert_eq!(parsed["secondary"], "owl");
        assert_eq!(parsed["tally"]["cheetah"], 3);
        assert_eq!(parsed["tally"]["elephant"], 0);
        assert!(parsed.get("commitment").is_none());
    }

    #[test]
    fn test_json_render_includes_commitment() {
        let report = test_report().with_commitment("Practice daily");
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["commitment"], "Practice daily");
    }
}
