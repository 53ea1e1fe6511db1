//! Colored output and progress reporting
//!
//! Uses owo-colors for terminal colors and indicatif for progress bars.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Standard spinner characters
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Standard tick interval for spinners
const TICK_INTERVAL_MS: u64 = 80;

/// Print an action header (blue, bold)
/// Example: "==> Processing mt7996_dsp"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a detail line (dimmed prefix)
/// Example: "     downloading https://..."
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print a success message (green)
pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Create a spinner progress bar with standard styling.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("     {spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars(SPINNER_CHARS),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(TICK_INTERVAL_MS));
    pb
}

/// Upgrade a spinner to a byte progress bar when content length becomes known.
pub fn upgrade_to_bytes(pb: &ProgressBar, total_bytes: u64) {
    pb.set_length(total_bytes);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("     {spinner:.cyan} [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta})")
            .unwrap()
            .progress_chars("━╸━"),
    );
}
