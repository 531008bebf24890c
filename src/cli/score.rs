//! Score command - diagnose from answers given on the command line

use super::quiz::QuizEnv;
use crate::reporters::{self, OutputFormat};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub fn run(
    env: &QuizEnv,
    name: &str,
    answers: &[String],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let driver = env.diagnose(name, answers)?;
    let report = env.report(driver.session())?;
    let rendered = reporters::report_with_format(&report, format)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!(
                "{} Report written to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
