//! Card command - issue the declaration card as a PNG

use super::quiz::QuizEnv;
use crate::export::ArtifactExporter;
use crate::session::Event;
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

pub fn run(
    env: &QuizEnv,
    name: &str,
    answers: &[String],
    commitment: &str,
    out_dir: Option<&Path>,
    scale: Option<u32>,
) -> Result<()> {
    let mut driver = env.diagnose(name, answers)?;
    driver.dispatch(Event::SubmitCommitment(commitment.to_string()))?;
    let declaration = env.declaration(driver.session())?;

    let mut options = env.config.raster_options();
    if let Some(scale) = scale {
        options.scale = scale;
    }
    let dir = out_dir.unwrap_or_else(|| env.config.output_dir());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(create_spinner_style());
    spinner.set_message("Rendering declaration card...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let exporter = ArtifactExporter::with_options(options);
    let rt = tokio::runtime::Runtime::new()?;
    let saved = rt.block_on(exporter.save(&declaration, dir));
    spinner.finish_and_clear();

    let path = saved.context("Failed to export declaration card")?;
    println!(
        "{} {} is a {}. Card saved to {}",
        style("✓").green(),
        declaration.display_name(),
        style(&declaration.profile().name).bold(),
        style(path.display()).cyan()
    );
    Ok(())
}

pub(super) fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .expect("valid template")
}
