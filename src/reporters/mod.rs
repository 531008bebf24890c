//! Output reporters for diagnosis results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON
//! - `markdown` - GitHub-flavored Markdown

mod json;
mod markdown;
mod text;

use crate::catalog::Catalog;
use crate::models::{BrainType, BrainTypeProfile, DiagnosticResult, Tally};
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::str::FromStr;

/// Section titles for the three strategy lists
pub const STRATEGY_SECTIONS: [&str; 3] = ["Read smarter", "Remember more", "Decide wisely"];

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Everything a reporter shows about one diagnosis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultReport {
    pub display_name: String,
    pub question_count: usize,
    pub primary: BrainTypeProfile,
    pub secondary: BrainType,
    pub secondary_name: String,
    pub tally: Tally,
    pub ranking: Vec<BrainType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>,
}

impl ResultReport {
    pub fn new(display_name: &str, result: &DiagnosticResult, catalog: &Catalog) -> Self {
        Self {
            display_name: display_name.to_string(),
            question_count: result.tally.total(),
            primary: catalog.profile(result.primary).clone(),
            secondary: result.secondary,
            secondary_name: catalog.profile(result.secondary).name.clone(),
            tally: result.tally.clone(),
            ranking: result.ranking.clone(),
            commitment: None,
        }
    }

    pub fn with_commitment(mut self, commitment: impl Into<String>) -> Self {
        self.commitment = Some(commitment.into());
        self
    }

    /// "Lee leads as The Owl, but also makes great use of The Cheetah."
    pub fn secondary_line(&self) -> String {
        format!(
            "{} leads as {}, but also makes great use of {}.",
            self.display_name, self.primary.name, self.secondary_name
        )
    }

    /// The three strategy lists with their section titles
    pub fn strategies(&self) -> [(&'static str, &[String]); 3] {
        [
            (STRATEGY_SECTIONS[0], self.primary.reading_strategy.as_slice()),
            (STRATEGY_SECTIONS[1], self.primary.memory_strategy.as_slice()),
            (STRATEGY_SECTIONS[2], self.primary.decision_strategy.as_slice()),
        ]
    }
}

/// Render a result report using an OutputFormat enum
pub fn report_with_format(report: &ResultReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
        OutputFormat::Markdown => markdown::render(report),
    }
}
