//! Share command - share the result link

use super::quiz::QuizEnv;
use crate::export::{share, Osc52Clipboard, PrintShare, ShareOutcome, SharePayload};
use anyhow::Result;
use console::style;
use std::io;

pub fn run(env: &QuizEnv, name: &str, answers: &[String], native: bool) -> Result<()> {
    let driver = env.diagnose(name, answers)?;
    let report = env.report(driver.session())?;
    let payload = SharePayload::new(
        &report.display_name,
        &report.primary.name,
        env.config.share_url(),
    )
    .with_title(env.config.share_title());

    let mut clipboard = Osc52Clipboard::new(io::stdout());
    let outcome = if native {
        let mut printer = PrintShare::new(io::stdout());
        share(Some(&mut printer), &mut clipboard, &payload)
    } else {
        share(None, &mut clipboard, &payload)
    };

    match (&outcome, outcome.notice()) {
        (ShareOutcome::Copied, Some(notice)) => {
            println!("{}", payload.url);
            eprintln!("{} {}", style("✓").green(), notice);
        }
        (_, Some(notice)) => eprintln!("{} {}", style("!").yellow(), notice),
        (_, None) => {}
    }
    Ok(())
}
