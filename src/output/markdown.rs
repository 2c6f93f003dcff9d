//! Markdown report generation
//!
//! Produces a shareable markdown document for a site audit: run counts, the
//! violation overview as tables, crawl errors and per-page outcomes.

use crate::output::OutputResult;
use crate::site_audit::{PageAuditRecord, SiteAuditResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report for a site audit to `output_path`
pub fn write_markdown_report(result: &SiteAuditResult, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(result);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a site audit as markdown
pub fn format_markdown_report(result: &SiteAuditResult) -> String {
    let mut md = String::new();

    md.push_str("# Accessibility Audit Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", result.start_url));
    md.push_str(&format!("- **Pages Crawled**: {}\n", result.crawl.pages.len()));
    md.push_str(&format!("- **Links Skipped**: {}\n", result.crawl.skipped));
    md.push_str(&format!("- **Crawl Errors**: {}\n\n", result.crawl.errors.len()));

    md.push_str("## Audit Summary\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages | {} |\n", result.summary.total_pages));
    md.push_str(&format!("| Audited | {} |\n", result.summary.successes));
    md.push_str(&format!("| Failed | {} |\n", result.summary.failures));
    md.push_str(&format!(
        "| Violations | {} |\n\n",
        result.summary.total_violations
    ));

    let overview = result.overview();
    if !overview.is_empty() {
        md.push_str("## Violation Overview\n\n");
        md.push_str("| Rule | Impact | WCAG | Occurrences | Pages | Scope |\n");
        md.push_str("|------|--------|------|-------------|-------|-------|\n");

        for entry in &overview {
            md.push_str(&format!(
                "| [{}]({}) | {} | {} | {} | {} | {} |\n",
                entry.id,
                entry.help_url,
                entry.impact,
                entry.wcag_level,
                entry.total_occurrences,
                entry.pages.len(),
                entry.scope()
            ));
        }
        md.push('\n');

        for entry in overview.iter().filter(|e| e.is_structural()) {
            md.push_str(&format!("### {}\n\n", entry.id));
            md.push_str(&format!("{}\n\n", entry.description));
            for page in &entry.pages {
                md.push_str(&format!("- {} ({})\n", page.url, page.occurrences));
            }
            md.push('\n');
        }
    }

    if !result.crawl.errors.is_empty() {
        md.push_str("## Crawl Errors\n\n");
        md.push_str("| URL | Error |\n");
        md.push_str("|-----|-------|\n");
        for error in &result.crawl.errors {
            md.push_str(&format!("| {} | {} |\n", error.url, error.error));
        }
        md.push('\n');
    }

    if !result.audits.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| URL | Result |\n");
        md.push_str("|-----|--------|\n");
        for record in &result.audits {
            let outcome = match record {
                PageAuditRecord::Success { result, .. } => {
                    format!("{} violations", result.summary.total_violations)
                }
                PageAuditRecord::Failure { error, .. } => format!("audit failed: {}", error),
            };
            md.push_str(&format!("| {} | {} |\n", record.url(), outcome));
        }
        md.push('\n');
    }

    md
}
