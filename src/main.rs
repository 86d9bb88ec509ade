//! twtvt - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use twtvt::{
    cli::Args,
    config::{validate_config, Config},
    download::{execute, DownloadJob, ExecutionMode},
    error::{exit_codes, Result},
    fetch::{HostRouter, MonsnodeFetcher, YtDlpFetcher},
    fs::write_link_backup,
    output::{
        print_banner, print_config_summary, print_error, print_info, print_run_summary,
        print_success, print_warning, ProgressReporter,
    },
    scraper::CommandScraper,
    target::{extract_links, validate_targets},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration and merge CLI arguments into it
    let mut config = Config::load_or_default(&args.config)?;
    args.merge_into_config(&mut config);
    validate_config(&config)?;

    // Reject bad targets before touching the network or the filesystem
    validate_targets(&args.targets)?;

    let mode = config.execution_mode();
    let mode_label = match mode {
        ExecutionMode::Sequential => "sequential".to_string(),
        ExecutionMode::Parallel { workers } => format!("parallel ({} workers)", workers),
    };
    print_config_summary(
        &args.targets,
        &mode_label,
        &config.options.output_directory.display().to_string(),
    );

    // Resolve targets into links
    let scraper = CommandScraper::new(&config.tools.scraper, args.debug);
    let credentials = config.credentials();
    let links = extract_links(
        &args.targets,
        credentials.as_ref(),
        config.until_link(),
        &scraper,
    )
    .await?;

    if links.is_empty() {
        print_warning("No links found, nothing to download");
        return Ok(());
    }
    print_info(format!("Found {} links", links.len()));

    // Save the links before downloading anything
    let backup = write_link_backup(&links, &config.options.output_directory)?;
    print_info(format!("Link backup: {}", backup.display()));

    // External-host pages are resolved directly, everything else goes to yt-dlp
    let fetcher = HostRouter::new(
        Arc::new(MonsnodeFetcher::new()?),
        Arc::new(YtDlpFetcher::new(&config.tools.yt_dlp)),
    );
    let job = DownloadJob {
        fetcher: Arc::new(fetcher),
        output_dir: config.options.output_directory.clone(),
        cookies: config.cookie_browser()?,
        policy: config.retry_policy(),
    };
    let progress = match mode {
        ExecutionMode::Sequential => ProgressReporter::lines(links.len()),
        ExecutionMode::Parallel { .. } => ProgressReporter::bar(links.len()),
    };

    let summary = execute(job, links, mode, &progress).await;
    print_run_summary(&summary);

    // Per-link failures are reported, not fatal
    if summary.failed.is_empty() {
        print_success("All downloads finished");
    } else {
        print_warning(format!("{} downloads failed", summary.failed.len()));
    }

    Ok(())
}
