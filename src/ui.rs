//! Display helpers for the command-line driver.
//!
//! Pure formatting and printing; no prompts and no engine state.

use crate::aggregate::ReleasePlan;
use crate::commands::CommandObserver;
use crate::matcher::FileMatches;
use crate::release::ReleaseOutcome;
use console::style;

/// Print an error message in red to stderr.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Print a success message with a green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print a status message with a yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display the computed release plan and the located version-file matches.
///
/// Used for dry runs: shows what the release would do without mutating
/// anything.
pub fn display_plan(plan: &ReleasePlan, scans: &[FileMatches]) {
    println!(
        "\n{} {} -> {} ({} bump, {} records)",
        style("Release:").bold(),
        style(&plan.old_version).red(),
        style(&plan.new_version).green(),
        plan.severity,
        plan.record_count()
    );

    for scanned in scans {
        println!("  {}", style(&scanned.file.path).bold());
        for m in &scanned.matches {
            println!(
                "    line {}, column {}: {} -> {}",
                m.line, m.column, m.text, plan.new_version
            );
        }
    }
}

/// Display the outcome of a release run.
pub fn display_outcome(outcome: &ReleaseOutcome) {
    match outcome {
        ReleaseOutcome::NoChanges => {
            display_status("No pending changes. Nothing to release.");
        }
        ReleaseOutcome::Released {
            old_version,
            new_version,
            tag,
            command_failure,
        } => {
            if let Some(failure) = command_failure {
                display_error(&format!("Post-bump command failed: {}", failure));
            }
            display_success(&format!(
                "Release applied. Updated from version {} to {}",
                old_version, new_version
            ));
            if let Some(tag) = tag {
                display_success(&format!("Created tag: {}", tag));
            }
        }
    }
}

/// Observer that forwards post-bump command output to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl CommandObserver for ConsoleObserver {
    fn output(&mut self, text: &str) {
        print!("{}", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_helpers_do_not_panic() {
        // Visual verification test - output is printed to stdout/stderr
        display_error("test error");
        display_success("test success");
        display_status("test status");
        display_outcome(&ReleaseOutcome::NoChanges);
    }
}
