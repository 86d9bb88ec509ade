//! Console output utilities.

use std::fmt::Display;

use console::style;

/// Print an info message.
pub fn print_info(message: impl Display) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: impl Display) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: impl Display) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: impl Display) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     twtvt                                             ║
║     Collect feed video links and download them        ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(targets: &[String], mode: &str, output_dir: &str) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Targets: {}", targets.join(", "));
    println!("  Mode: {}", mode);
    println!("  Output: {}", output_dir);
    println!();
}
