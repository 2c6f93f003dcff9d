//! Plain-text console reports

use crate::audit::{AuditResult, Impact};
use crate::site_audit::{PageAuditRecord, SiteAuditResult};
use std::fmt::Write;

/// Formats a single page audit: summary counts, then violations grouped by
/// impact from critical to minor
pub fn format_audit_report(result: &AuditResult) -> String {
    let mut out = String::new();
    let s = &result.summary;

    let _ = writeln!(out, "=== Accessibility Audit ===\n");
    let _ = writeln!(out, "URL: {}", result.url);
    let _ = writeln!(out, "Audited at: {}\n", result.timestamp);

    let _ = writeln!(out, "Summary:");
    let _ = writeln!(
        out,
        "  Violations: {} (critical {}, serious {}, moderate {}, minor {})",
        s.total_violations,
        s.critical_violations,
        s.serious_violations,
        s.moderate_violations,
        s.minor_violations
    );
    let _ = writeln!(out, "  Passed rules: {}", s.total_passes);
    let _ = writeln!(out, "  Needs review: {}", s.incomplete);

    if result.violations.is_empty() {
        let _ = writeln!(out, "\n✓ No violations found");
        return out;
    }

    for impact in Impact::ALL {
        let group: Vec<_> = result
            .violations
            .iter()
            .filter(|v| v.impact == impact)
            .collect();
        if group.is_empty() {
            continue;
        }

        let _ = writeln!(out, "\n{} ({}):", capitalize(impact.as_str()), group.len());
        for violation in group {
            let _ = writeln!(
                out,
                "  - {} [{}]: {}",
                violation.id, violation.wcag_level, violation.help
            );
            if !violation.help_url.is_empty() {
                let _ = writeln!(out, "    {}", violation.help_url);
            }
            if !violation.nodes.is_empty() {
                let targets: Vec<String> = violation
                    .nodes
                    .iter()
                    .map(|n| n.target.join(" "))
                    .collect();
                let _ = writeln!(
                    out,
                    "    {} element(s): {}",
                    violation.nodes.len(),
                    targets.join(", ")
                );
            }
        }
    }

    out
}

/// Formats a site audit
///
/// Crawl errors (pages that could not be fetched) and audit failures (pages
/// the auditor could not process) are reported in separate sections. With
/// `details`, the single-page report of every audited page is appended.
pub fn format_site_report(result: &SiteAuditResult, details: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Site Accessibility Audit ===\n");
    let _ = writeln!(out, "Start URL: {}\n", result.start_url);

    let _ = writeln!(out, "Crawl:");
    let _ = writeln!(out, "  Pages crawled: {}", result.crawl.pages.len());
    let _ = writeln!(out, "  Links skipped: {}", result.crawl.skipped);
    let _ = writeln!(out, "  Crawl errors: {}\n", result.crawl.errors.len());

    let _ = writeln!(out, "Audits:");
    let _ = writeln!(
        out,
        "  Audited: {} / {}",
        result.summary.successes, result.summary.total_pages
    );
    let _ = writeln!(out, "  Failed: {}", result.summary.failures);
    let _ = writeln!(out, "  Total violations: {}", result.summary.total_violations);

    let overview = result.overview();
    if !overview.is_empty() {
        let _ = writeln!(out, "\nViolation Overview:");
        for entry in &overview {
            let _ = writeln!(
                out,
                "  {} ({}, {}): {} occurrence(s) on {} page(s) [{}]",
                entry.id,
                entry.impact,
                entry.wcag_level,
                entry.total_occurrences,
                entry.pages.len(),
                entry.scope()
            );
            for page in &entry.pages {
                let _ = writeln!(out, "    - {} ({})", page.url, page.occurrences);
            }
        }
    }

    if !result.crawl.errors.is_empty() {
        let _ = writeln!(out, "\nCrawl Errors ({}):", result.crawl.errors.len());
        for error in &result.crawl.errors {
            let _ = writeln!(out, "  - {}: {}", error.url, error.error);
        }
    }

    if !result.audits.is_empty() {
        let _ = writeln!(out, "\nPages:");
        for record in &result.audits {
            match record {
                PageAuditRecord::Success { url, result } => {
                    let _ = writeln!(
                        out,
                        "  ✓ {}: {} violation(s)",
                        url, result.summary.total_violations
                    );
                }
                PageAuditRecord::Failure { url, error } => {
                    let _ = writeln!(out, "  ✗ {}: audit failed: {}", url, error);
                }
            }
        }
    }

    if details {
        for record in &result.audits {
            if let PageAuditRecord::Success { result, .. } = record {
                let _ = writeln!(out);
                out.push_str(&format_audit_report(result));
            }
        }
    }

    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
