//! Site audit records and options

use crate::audit::AuditResult;
use crate::crawler::{CrawlOptions, CrawlResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options for a site audit run
///
/// Every field is optional; unset crawl fields keep the crawler defaults and
/// an unset timeout keeps the auditor default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteAuditOptions {
    pub max_pages: Option<usize>,
    pub max_depth: Option<u32>,
    pub delay_ms: Option<u64>,
    pub same_origin: Option<bool>,
    pub timeout: Option<Duration>,
}

impl SiteAuditOptions {
    /// Applies the crawl fields that were explicitly set onto `base`
    pub fn crawl_options(&self, base: CrawlOptions) -> CrawlOptions {
        CrawlOptions {
            max_pages: self.max_pages.unwrap_or(base.max_pages),
            max_depth: self.max_depth.unwrap_or(base.max_depth),
            delay_ms: self.delay_ms.unwrap_or(base.delay_ms),
            same_origin: self.same_origin.unwrap_or(base.same_origin),
        }
    }
}

/// Outcome of auditing one crawled page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PageAuditRecord {
    Success {
        url: String,
        result: AuditResult,
    },
    #[serde(rename = "error")]
    Failure {
        url: String,
        error: String,
    },
}

impl PageAuditRecord {
    /// The audited page
    pub fn url(&self) -> &str {
        match self {
            PageAuditRecord::Success { url, .. } | PageAuditRecord::Failure { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PageAuditRecord::Success { .. })
    }
}

/// Run-level counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteAuditSummary {
    pub total_pages: usize,
    pub successes: usize,
    pub failures: usize,
    pub total_violations: usize,
}

/// Terminal artifact of one site audit run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteAuditResult {
    /// First crawled page, or the normalized seed if nothing was crawled
    pub start_url: String,
    pub crawl: CrawlResult,
    /// One record per crawled page, in crawl order
    pub audits: Vec<PageAuditRecord>,
    pub summary: SiteAuditSummary,
}
