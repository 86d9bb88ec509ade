//! Statistics reporting.

use console::style;

use crate::download::RunSummary;

/// Print the end-of-run summary.
pub fn print_run_summary(summary: &RunSummary) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Run Summary:").bold());
    println!("  Links:      {}", summary.total);
    println!("  Downloaded: {}", style(summary.succeeded).green());
    if !summary.failed.is_empty() {
        println!("  Failed:     {}", style(summary.failed.len()).red());
        let mut failed = summary.failed.clone();
        failed.sort_by_key(|(index, _, _)| *index);
        for (index, link, reason) in &failed {
            println!("    #{} {} ({})", index + 1, link, reason);
        }
    }
    if summary.missing() > 0 {
        println!("  Unfinished: {}", style(summary.missing()).yellow());
    }
    println!("{}", style("═".repeat(50)).dim());
}
