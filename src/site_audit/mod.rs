//! Site audit module
//!
//! Combines the crawler and the page auditor into a whole-site run and
//! derives the cross-page violation overview from its results.

mod aggregate;
mod runner;
mod types;

pub use aggregate::{aggregate_violations, PageOccurrences, ViolationOverviewEntry, ViolationScope};
pub use runner::{AuditorFactory, SiteAuditRunner};
pub use types::{PageAuditRecord, SiteAuditOptions, SiteAuditResult, SiteAuditSummary};

impl SiteAuditResult {
    /// Violation overview across all successfully audited pages
    pub fn overview(&self) -> Vec<ViolationOverviewEntry> {
        aggregate_violations(&self.audits)
    }
}
