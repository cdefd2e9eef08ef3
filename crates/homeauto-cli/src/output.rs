//! Output formatting utilities

use colored::Colorize;

/// Print a section header
pub(crate) fn section(title: &str) {
    println!("\n{}", format!("=== {title} ===").cyan().bold());
}

/// Print a key-value pair
pub(crate) fn kv(key: &str, value: impl std::fmt::Display) {
    println!("  {}: {}", key.white().bold(), value);
}

/// Print a success message
pub(crate) fn success(msg: &str) {
    println!("{} {}", "[PASS]".green().bold(), msg);
}

/// Print a warning message
pub(crate) fn warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// Print an info message
pub(crate) fn info(msg: &str) {
    println!("{} {}", "[INFO]".blue(), msg);
}

/// Accuracy as a colored two-decimal figure: green from 0.9, yellow from
/// 0.7, red below.
pub(crate) fn accuracy(value: f32) -> String {
    let text = format!("{value:.2}");
    if value >= 0.9 {
        text.green().to_string()
    } else if value >= 0.7 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

/// Print a 1-based numbered list
pub(crate) fn numbered(lines: &[String]) {
    for line in homeauto::recommend::numbered(lines) {
        println!("  {line}");
    }
}
