//! Reach main entry point
//!
//! This is the command-line interface for the Reach accessibility auditor.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use reach::audit::{auditor_from_config, AuditOptions, PageAuditor};
use reach::config::{load_config, Config};
use reach::crawler::{CrawlOptions, SiteCrawler};
use reach::output::{emit, render_audit, render_site_audit, OutputFormat};
use reach::site_audit::{SiteAuditOptions, SiteAuditRunner};
use reach::normalize_url;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Reach: site-wide accessibility auditing
///
/// Reach audits single pages, or crawls a site breadth-first and audits
/// every page it finds, then reports which violations repeat across the
/// site and which are isolated to one page.
#[derive(Parser, Debug)]
#[command(name = "reach")]
#[command(version)]
#[command(about = "Site-wide accessibility auditor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Audit a single page
    Audit {
        /// Page to audit
        url: String,

        /// Audit timeout in milliseconds
        #[arg(long, value_name = "MS")]
        timeout: Option<u64>,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Crawl a site and audit every page found
    Crawl {
        /// Start URL
        url: String,

        /// Maximum number of pages to crawl and audit
        #[arg(long, value_name = "N")]
        max_pages: Option<usize>,

        /// Maximum link depth from the start URL
        #[arg(long, value_name = "N")]
        max_depth: Option<u32>,

        /// Pause between crawl requests in milliseconds
        #[arg(long, value_name = "MS")]
        delay: Option<u64>,

        /// Follow links to other origins
        #[arg(long)]
        allow_external: bool,

        /// Per-page audit timeout in milliseconds
        #[arg(long, value_name = "MS")]
        timeout: Option<u64>,

        /// Append the full report of every audited page
        #[arg(long)]
        details: bool,

        #[command(flatten)]
        report: ReportArgs,
    },
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    output: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    match cli.command {
        Command::Audit {
            url,
            timeout,
            report,
        } => handle_audit(&config, &url, timeout, &report).await,
        Command::Crawl {
            url,
            max_pages,
            max_depth,
            delay,
            allow_external,
            timeout,
            details,
            report,
        } => {
            let options = SiteAuditOptions {
                max_pages,
                max_depth,
                delay_ms: delay,
                same_origin: allow_external.then_some(false),
                timeout: Some(audit_timeout(&config, timeout)),
            };
            handle_crawl(config, &url, &options, details, &report).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("reach=info,warn"),
            1 => EnvFilter::new("reach=debug,info"),
            2 => EnvFilter::new("reach=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Reports go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn audit_timeout(config: &Config, flag: Option<u64>) -> Duration {
    Duration::from_millis(flag.unwrap_or(config.auditor.timeout_ms))
}

/// Handles `reach audit`: audits one page and reports it
async fn handle_audit(
    config: &Config,
    url: &str,
    timeout: Option<u64>,
    report: &ReportArgs,
) -> anyhow::Result<()> {
    let Some(url) = normalize_url(url, None) else {
        bail!("Invalid URL: {}", url);
    };

    let mut auditor = auditor_from_config(config)?;
    let options = AuditOptions {
        timeout: Some(audit_timeout(config, timeout)),
        include_raw: true,
    };

    let outcome = auditor.audit(&url, &options).await;
    if let Err(e) = auditor.close().await {
        tracing::warn!("Failed to close auditor: {}", e);
    }
    let result = outcome.with_context(|| format!("Audit of {} failed", url))?;

    let rendered = render_audit(&result, report.output)?;
    emit(&rendered, report.file.as_deref())?;

    Ok(())
}

/// Handles `reach crawl`: crawls the site, audits every page and reports
async fn handle_crawl(
    config: Config,
    url: &str,
    options: &SiteAuditOptions,
    details: bool,
    report: &ReportArgs,
) -> anyhow::Result<()> {
    let crawler = SiteCrawler::from_config(&config.user_agent)
        .context("Failed to build HTTP client")?;
    let crawl_defaults = CrawlOptions::from(&config.crawler);

    let runner = SiteAuditRunner::new(
        crawler,
        Box::new(move || -> reach::AuditOutcome<Box<dyn PageAuditor>> {
            Ok(Box::new(auditor_from_config(&config)?))
        }),
    )
    .with_crawl_defaults(crawl_defaults);

    let result = runner.run(url, options).await?;

    let rendered = render_site_audit(&result, report.output, details)?;
    emit(&rendered, report.file.as_deref())?;

    Ok(())
}
