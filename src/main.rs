//! Shiori main entry point
//!
//! This is the command-line interface for the Shiori serialized-fiction
//! locator and downloader.

use anyhow::{anyhow, Context};
use clap::Parser;
use shiori::config::load_config;
use shiori::crawler::CrawlContext;
use shiori::output::document_path;
use shiori::{run, RunOptions, RunOutcome, ShioriError};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Shiori: find a serialized work on a site and save it as one document
///
/// Shiori searches the selected site for the page listing every chapter of
/// the work, downloads the chapters concurrently and writes them to a text
/// file in their original order.
#[derive(Parser, Debug)]
#[command(name = "shiori")]
#[command(version)]
#[command(about = "Locate and download a serialized work", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "shiori.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Index of the configured site to search
    #[arg(short, long, default_value_t = 0)]
    site_id: usize,

    /// Title of the work (overrides the configured title)
    #[arg(short, long)]
    title: Option<String>,

    /// Output document path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the chapter list instead of downloading it
    #[arg(long)]
    list_only: bool,

    /// Do not draw the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::debug!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    let title = cli
        .title
        .clone()
        .or_else(|| config.title.clone())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| anyhow!("No title given; pass --title or set `title` in the configuration"))?;
    let site = config.site(cli.site_id)?;
    let ctx = CrawlContext::new(&config, site, &title)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping");
            on_interrupt.cancel();
        }
    });

    let output = cli.output.clone().unwrap_or_else(|| {
        document_path(
            Path::new(&config.output.directory),
            &title,
            &config.output.extension,
        )
    });
    let options = RunOptions {
        output,
        list_only: cli.list_only,
        show_progress: !cli.no_progress && !cli.quiet,
    };

    report(cli.quiet, format!("Locating {} on {} ...", title, site));
    let outcome = run(&ctx, &options, &cancel).await.map_err(|e| match e {
        ShioriError::ChapterFetch { .. } | ShioriError::Io(_) => {
            anyhow::Error::new(e).context(format!(
                "Capture stopped; chapters written so far remain in {}",
                options.output.display()
            ))
        }
        other => other.into(),
    })?;

    match outcome {
        RunOutcome::NotFound => println!("{} was not found on {}", title, site),
        RunOutcome::NoChapters { contents } => {
            println!("No chapters are listed on {}", contents)
        }
        RunOutcome::Listed { contents, chapters } => {
            report(cli.quiet, format!("Contents page: {}", contents));
            for chapter in &chapters {
                println!("{:>5}  {}  {}", chapter.index + 1, chapter.title, chapter.url);
            }
        }
        RunOutcome::Captured { path, report: summary } => {
            if !summary.placeholders.is_empty() {
                tracing::warn!(
                    "{} chapters could not be downloaded and were left as placeholders",
                    summary.placeholders.len()
                );
            }
            report(
                cli.quiet,
                format!(
                    "Finished: {} chapters written to {}",
                    summary.chapters_written,
                    path.display()
                ),
            );
        }
    }
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shiori=info,warn"),
            1 => EnvFilter::new("shiori=debug,info"),
            2 => EnvFilter::new("shiori=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn report(quiet: bool, message: String) {
    if !quiet {
        println!("{}", message);
    }
}
