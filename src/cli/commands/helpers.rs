//! Helper utilities for CLI commands.

use console::style;

use crate::config::Settings;
use crate::services::Degradation;

/// Truncate a string to a maximum number of characters, adding "..." if truncated.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a warning line for each degraded annotation step.
pub fn print_degradations(degradations: &[Degradation]) {
    for degradation in degradations {
        println!("  {} {}", style("!").yellow(), degradation);
    }
}

/// Tell the user to run `init` when no database exists yet.
pub fn require_database(settings: &Settings) -> bool {
    if settings.database_exists() {
        return true;
    }
    println!(
        "{} No database at {}. Run 'dochub init' first.",
        style("!").yellow(),
        settings.database_path().display()
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title here", 10), "a longe...");
        assert_eq!(truncate("Tiếng Việt có dấu", 8), "Tiếng...");
    }
}
