//! Formatting utilities for sizes, durations, and build summaries.

use console::Term;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Format a file size in human-readable form (B, KB, MB, GB).
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a duration in human-readable form (ms, s, m:s).
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}

/// Print a build summary table to stderr.
///
/// `entries` are (file name, size in bytes) pairs; `duration` is the whole
/// pass.
pub fn print_build_summary(entries: &[(String, u64)], duration: Duration) {
    let term = Term::stderr();
    let width = term.size().1 as usize;

    eprintln!("\n{}", "Build Summary".bold().underline());
    eprintln!("{}", "─".repeat(width.min(80)));

    for (name, size) in entries {
        eprintln!(
            "  {} {} {}",
            "▸".blue(),
            name.bright_white().bold(),
            format_size(*size).dimmed()
        );
    }

    eprintln!("{}", "─".repeat(width.min(80)));

    let total_size: u64 = entries.iter().map(|(_, s)| s).sum();
    eprintln!(
        "  {} {} in {}",
        "Total:".bold(),
        format_size(total_size).green(),
        format_duration(duration).green()
    );
}
