//! Styled console output helpers.

use console::style;

/// Console output helper used by the CLI commands.
pub struct Output;

impl Output {
    /// Informational message.
    pub fn info(msg: &str) {
        println!("{} {}", style("•").cyan().bold(), msg);
    }

    /// Success message.
    pub fn success(msg: &str) {
        println!("{} {}", style("✓").green().bold(), msg);
    }

    /// Warning, printed to stderr.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style("!").yellow().bold(), msg);
    }

    /// Error, printed to stderr.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style("✗").red().bold(), msg);
    }

    /// Section header with a rule underneath.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold());
        println!("{}", style("─".repeat(msg.chars().count())).dim());
    }

    /// Aligned key/value line.
    pub fn kv(key: &str, value: &str) {
        println!("  {} {}", style(format!("{:<20}", key)).dim(), value);
    }
}
