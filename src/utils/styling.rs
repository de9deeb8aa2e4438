//! Terminal styling for the training run

use console::{style, Emoji};
use std::path::Path;
use std::time::Duration;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static GRID: Emoji<'_, '_> = Emoji("🔢 ", "");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
    ┌─┐┬─┐┌─┐┌┬┐┬┌┬┐   ┌┬┐┌─┐┌─┐┌─┐┬ ┬┬ ┌┬┐
    │  ├┬┘├┤  │││ │ ───  ││├┤ ├┤ ├─┤│ ││  │
    └─┘┴└─└─┘─┴┘┴ ┴     ─┴┘└─┘└  ┴ ┴└─┘┴─┘┴
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Credit card default classifier: PCA, SelectKBest, SVC").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// What the configuration card shows
pub struct RunOverview<'a> {
    pub train: &'a Path,
    pub test: &'a Path,
    pub model_output: &'a Path,
    pub metrics_output: &'a Path,
    pub cv_folds: usize,
    pub candidates: usize,
}

/// Print configuration card
pub fn print_config(overview: &RunOverview<'_>) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!("    │  {} Train:   {:<38}│", FOLDER, truncate_path(overview.train, 37));
    println!("    │  {} Test:    {:<38}│", FOLDER, truncate_path(overview.test, 37));
    println!("    │  {} Model:   {:<38}│", SAVE, truncate_path(overview.model_output, 37));
    println!("    │  {} Metrics: {:<38}│", CHART, truncate_path(overview.metrics_output, 37));
    println!("    ├{}┤", line);
    println!(
        "    │  {} CV folds:   {:<35}│",
        GRID,
        style(overview.cv_folds).yellow()
    );
    println!(
        "    │  {} Candidates: {:<35}│",
        GRID,
        style(overview.candidates).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print how long a step took
pub fn print_step_time(elapsed: Duration) {
    println!(
        "      {}{}",
        CLOCK,
        style(format!("{:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!("    {} {}", ROCKET, style("Training complete!").green().bold());
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      Found {} {}", style(count).yellow().bold(), description);
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    truncate_string(&path.display().to_string(), max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_the_tail() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("files/input/train_data.csv.zip", 12), "...a.csv.zip");
    }
}
