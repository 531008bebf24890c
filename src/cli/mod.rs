//! CLI command definitions and handlers

mod card;
mod questions;
mod quiz;
mod score;
mod share;
mod take;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;

use crate::config::{UserConfig, ENV_CATALOG, ENV_OUTPUT_DIR, ENV_SHARE_URL};
use quiz::QuizEnv;

/// braintype - C.O.D.E brain type diagnosis
///
/// Everything runs locally. Nothing leaves your machine unless you share it.
#[derive(Parser, Debug)]
#[command(name = "braintype")]
#[command(
    version,
    about = "Brain type self-assessment: take the C.O.D.E quiz, see your profile, export a declaration card",
    long_about = "braintype asks a short series of questions and maps each answer to one of four \
brain types: Cheetah, Owl, Dolphin or Elephant. The type you pick most often is your primary \
type; the runner-up is your secondary engine.\n\n\
Run without a subcommand to take the quiz interactively:\n  \
braintype",
    after_help = "\
Examples:
  braintype                                         Take the quiz in the terminal
  braintype questions                               List the questions and options
  braintype score --name Lee --answers 1,2,owl,...  Score answers without the UI
  braintype score ... --format json                 JSON output for scripting
  braintype card ... --commitment \"Read daily\"      Save a declaration card PNG
  braintype share ...                               Copy the share link to the clipboard"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Question catalog to use instead of the configured or built-in one
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Take the quiz interactively (default)
    Take,

    /// Score a full set of answers and print the result
    #[command(after_help = "\
Each answer is an option number (1-4) or a type name (cheetah, owl, dolphin, elephant).

Examples:
  braintype score --name Lee --answers 1,3,owl,2,...          Text report
  braintype score --name Lee --answers ... --format json      JSON for scripting
  braintype score --name Lee --answers ... -f md -o me.md     Markdown file")]
    Score {
        /// Display name shown on the result
        #[arg(long)]
        name: String,

        /// One answer per question, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        answers: Vec<String>,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Score answers, commit to a promise and save the declaration card
    #[command(after_help = "\
Examples:
  braintype card --name Lee --answers ... --commitment \"Read one chapter a day\"
  braintype card --name Lee --answers ... --commitment \"...\" --out-dir cards --scale 2")]
    Card {
        /// Display name shown on the card
        #[arg(long)]
        name: String,

        /// One answer per question, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        answers: Vec<String>,

        /// Your commitment (at least 5 characters)
        #[arg(long)]
        commitment: String,

        /// Directory to save the PNG in (default: config or current directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Pixel density multiplier (default: 3)
        #[arg(long)]
        scale: Option<u32>,
    },

    /// Share a result: copies the link, or prints the share sheet with --native
    Share {
        /// Display name used in the share text
        #[arg(long)]
        name: String,

        /// One answer per question, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        answers: Vec<String>,

        /// Print the full share sheet instead of copying the link
        #[arg(long)]
        native: bool,
    },

    /// List the questions and their options
    Questions {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize config file with example settings
    Init,
    /// Show current config and paths
    Show,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let catalog = cli.catalog.as_deref();
    match cli.command {
        None | Some(Commands::Take) => take::run(QuizEnv::load(catalog)?),

        Some(Commands::Score {
            name,
            answers,
            format,
            output,
        }) => {
            let env = QuizEnv::load(catalog)?;
            score::run(&env, &name, &answers, format.parse()?, output.as_deref())
        }

        Some(Commands::Card {
            name,
            answers,
            commitment,
            out_dir,
            scale,
        }) => {
            let env = QuizEnv::load(catalog)?;
            card::run(
                &env,
                &name,
                &answers,
                &commitment,
                out_dir.as_deref(),
                scale,
            )
        }

        Some(Commands::Share {
            name,
            answers,
            native,
        }) => {
            let env = QuizEnv::load(catalog)?;
            share::run(&env, &name, &answers, native)
        }

        Some(Commands::Questions { json }) => {
            let env = QuizEnv::load(catalog)?;
            questions::run(&env.catalog, json)
        }

        Some(Commands::Config { action }) => run_config_action(action),
    }
}

fn run_config_action(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = UserConfig::init_user_config()?;
            println!("{} Config initialized at: {}", style("✓").green(), path.display());
            println!("\nEdit it to change quiz timing, card scale or the share link:");
            println!("  {}", path.display());
            println!("\nOr set via environment:");
            println!("  export {}=\"https://example.com/quiz\"", ENV_SHARE_URL);
            Ok(())
        }
        ConfigAction::Show => show_config(),
    }
}

fn show_config() -> Result<()> {
    let config = UserConfig::load()?;
    println!("Config paths:");
    if let Some(user_path) = UserConfig::user_config_path() {
        let status = if user_path.exists() {
            "✓"
        } else {
            "(not found)"
        };
        println!("  User:    {} {}", user_path.display(), status);
    }
    println!();

    let timings = config.timings();
    println!("Quiz:");
    println!("  Auto-advance:   {} ms", timings.auto_advance.as_millis());
    println!("  Analysis delay: {} ms", timings.analysis_delay.as_millis());
    match config.catalog_path() {
        Some(path) => println!("  Catalog:        {}", path.display()),
        None => println!("  Catalog:        built-in"),
    }
    println!();

    let raster = config.raster_options();
    println!("Export:");
    println!("  Scale:          {}", raster.scale);
    println!("  Max canvas:     {} px", raster.max_canvas_px);
    println!("  Output dir:     {}", config.output_dir().display());
    println!();

    println!("Share:");
    println!("  URL:            {}", config.share_url());
    println!("  Title:          {}", config.share_title());
    println!();

    println!("Environment overrides: {ENV_CATALOG}, {ENV_OUTPUT_DIR}, {ENV_SHARE_URL}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_take() {
        let cli = Cli::try_parse_from(["braintype"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_answers_split_on_commas() {
        let cli = Cli::try_parse_from([
            "braintype",
            "score",
            "--name",
            "Lee",
            "--answers",
            "1,owl,3",
            "-f",
            "md",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Score {
                answers, format, ..
            }) => {
                assert_eq!(answers, vec!["1", "owl", "3"]);
                assert_eq!(format, "md");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = Cli::try_parse_from([
            "braintype", "score", "--name", "Lee", "--answers", "1", "-f", "sarif",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_catalog_flag() {
        let cli =
            Cli::try_parse_from(["braintype", "questions", "--catalog", "mine.toml"]).unwrap();
        assert_eq!(cli.catalog, Some(PathBuf::from("mine.toml")));
    }
}
