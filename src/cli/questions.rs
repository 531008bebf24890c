//! Questions command - list the catalog

use crate::catalog::Catalog;
use anyhow::Result;
use console::style;

pub fn run(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.questions())?);
        return Ok(());
    }

    for (i, question) in catalog.questions().iter().enumerate() {
        println!(
            "{} {}",
            style(format!("{:>2}.", i + 1)).dim(),
            style(&question.text).bold()
        );
        for (n, option) in question.options.iter().enumerate() {
            println!(
                "     {} {} {}",
                style(n + 1).cyan(),
                option.label,
                style(format!("({})", option.brain_type)).dim()
            );
        }
    }
    println!(
        "\n{} questions. Answer with option numbers or type names, e.g. --answers 1,3,owl,...",
        catalog.len()
    );
    Ok(())
}
