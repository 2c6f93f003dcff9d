//! Output module for audit reports
//!
//! This module handles:
//! - Console reports for single-page and site audits
//! - JSON serialization of audit results
//! - Markdown site reports

mod console;
mod json;
mod markdown;

pub use console::{format_audit_report, format_site_report};
pub use json::{render_json, write_json_report};
pub use markdown::{format_markdown_report, write_markdown_report};

use crate::audit::AuditResult;
use crate::site_audit::SiteAuditResult;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while producing a report
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} output is not available for single-page audits")]
    Unsupported(OutputFormat),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Console => f.write_str("console"),
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Markdown => f.write_str("markdown"),
        }
    }
}

/// Renders a single page audit in the requested format
pub fn render_audit(result: &AuditResult, format: OutputFormat) -> OutputResult<String> {
    match format {
        OutputFormat::Console => Ok(format_audit_report(result)),
        OutputFormat::Json => render_json(result),
        OutputFormat::Markdown => Err(OutputError::Unsupported(format)),
    }
}

/// Renders a site audit in the requested format
pub fn render_site_audit(
    result: &SiteAuditResult,
    format: OutputFormat,
    details: bool,
) -> OutputResult<String> {
    match format {
        OutputFormat::Console => Ok(format_site_report(result, details)),
        OutputFormat::Json => render_json(result),
        OutputFormat::Markdown => Ok(format_markdown_report(result)),
    }
}

/// Writes a rendered report to `path`, or to stdout when no path is given
pub fn emit(report: &str, path: Option<&Path>) -> OutputResult<()> {
    match path {
        Some(path) => {
            std::fs::write(path, report)?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{}", report),
    }
    Ok(())
}
