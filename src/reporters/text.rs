//! Text (terminal) reporter with colors and formatting

use super::ResultReport;
use crate::catalog::Rgb;
use anyhow::Result;

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Width of the balance bar in cells
const BAR_WIDTH: usize = 20;

/// 24-bit foreground color for a profile hex color
fn profile_color(hex: &str) -> String {
    let rgb = Rgb::from_hex(hex).unwrap_or(Rgb::INDIGO);
    format!("\x1b[38;2;{};{};{}m", rgb.r, rgb.g, rgb.b)
}

/// Render report as formatted terminal output
pub fn render(report: &ResultReport) -> Result<String> {
    let mut out = String::new();
    let primary = &report.primary;
    let accent = profile_color(&primary.color);

    // Header
    out.push_str(&format!(
        "\n{BOLD}{}'s brain type{RESET}\n",
        report.display_name
    ));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "{accent}{BOLD}{}{RESET}  {DIM}{}{RESET}\n",
        primary.name, primary.english_name
    ));
    out.push_str(&format!("{}\n\n", primary.description));

    // Balance
    out.push_str(&format!(
        "{BOLD}C.O.D.E BALANCE{RESET} {DIM}(out of {}){RESET}\n",
        report.question_count
    ));
    let n = report.question_count.max(1);
    for (brain_type, count) in report.tally.iter() {
        let filled = count * BAR_WIDTH / n;
        let marker = if brain_type == primary.brain_type {
            accent.as_str()
        } else {
            DIM
        };
        out.push_str(&format!(
            "  {:<9} {marker}{}{RESET}{DIM}{}{RESET} {:>2}/{}\n",
            brain_type.as_str().to_uppercase(),
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH - filled),
            count,
            report.question_count
        ));
    }
    out.push('\n');

    // Insights
    out.push_str(&format!(
        "{BOLD}SECONDARY ENGINE{RESET}  {}\n  {}\n\n",
        report.secondary_name,
        report.secondary_line()
    ));
    out.push_str(&format!(
        "{BOLD}BEST CHEMISTRY{RESET}  {}\n  {DIM}\"{}\"{RESET}\n\n",
        primary.chemistry.partner, primary.chemistry.synergy
    ));
    out.push_str(&format!(
        "{BOLD}BLIND SPOT{RESET}\n  {}\n\n",
        primary.blind_spot
    ));

    // Strategies
    for (title, list) in report.strategies() {
        out.push_str(&format!("{BOLD}{}{RESET}\n", title.to_uppercase()));
        for item in list {
            out.push_str(&format!("  {accent}•{RESET} {}\n", item));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "{BOLD}RECOMMENDED ACTION{RESET}\n  {}\n",
        primary.recommended_action
    ));

    match &report.commitment {
        Some(commitment) => {
            out.push_str(&format!(
                "\n{BOLD}MY COMMITMENT{RESET}\n  {accent}\"{}\"{RESET}\n",
                commitment
            ));
        }
        None => out.push_str(&format!(
            "\n{DIM}Run `braintype card` with --commitment to issue your declaration card.{RESET}\n"
        )),
    }

    Ok(out)
}
