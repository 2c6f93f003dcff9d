//! Site audit runner
//!
//! Crawls a site, then audits every crawled page in crawl order through a
//! single [`PageAuditor`].

use crate::audit::{AuditOptions, PageAuditor};
use crate::crawler::{CrawlOptions, SiteCrawler};
use crate::site_audit::types::{
    PageAuditRecord, SiteAuditOptions, SiteAuditResult, SiteAuditSummary,
};
use crate::url::normalize_url;
use crate::{AuditOutcome, Result};

/// Creates the page auditor used for one run
pub type AuditorFactory = Box<dyn Fn() -> AuditOutcome<Box<dyn PageAuditor>> + Send + Sync>;

/// Drives a crawl followed by sequential page audits
pub struct SiteAuditRunner {
    crawler: SiteCrawler,
    auditor_factory: AuditorFactory,
    crawl_defaults: CrawlOptions,
}

impl SiteAuditRunner {
    pub fn new(crawler: SiteCrawler, auditor_factory: AuditorFactory) -> Self {
        Self {
            crawler,
            auditor_factory,
            crawl_defaults: CrawlOptions::default(),
        }
    }

    /// Sets the crawl options used for fields a run leaves unset
    pub fn with_crawl_defaults(mut self, defaults: CrawlOptions) -> Self {
        self.crawl_defaults = defaults;
        self
    }

    /// Crawls `start_url` and audits every page found
    ///
    /// Only an unparseable start URL fails the run. Pages that cannot be
    /// audited get a [`PageAuditRecord::Failure`] and the run moves on.
    pub async fn run(&self, start_url: &str, options: &SiteAuditOptions) -> Result<SiteAuditResult> {
        let crawl_options = options.crawl_options(self.crawl_defaults);
        let crawl = self.crawler.crawl(start_url, &crawl_options).await?;

        let audit_options = AuditOptions {
            timeout: options.timeout,
            include_raw: false,
        };

        let mut audits = Vec::with_capacity(crawl.pages.len());
        let mut summary = SiteAuditSummary {
            total_pages: crawl.pages.len(),
            ..Default::default()
        };

        match (self.auditor_factory)() {
            Ok(mut auditor) => {
                for (index, page) in crawl.pages.iter().enumerate() {
                    tracing::info!("Auditing page {}/{}: {}", index + 1, crawl.pages.len(), page);

                    match auditor.audit(page, &audit_options).await {
                        Ok(result) => {
                            summary.successes += 1;
                            summary.total_violations += result.summary.total_violations;
                            audits.push(PageAuditRecord::Success {
                                url: page.clone(),
                                result,
                            });
                        }
                        Err(e) => {
                            tracing::warn!("Audit of {} failed: {}", page, e);
                            summary.failures += 1;
                            audits.push(PageAuditRecord::Failure {
                                url: page.clone(),
                                error: e.to_string(),
                            });
                        }
                    }
                }

                if let Err(e) = auditor.close().await {
                    tracing::warn!("Failed to close page auditor: {}", e);
                }
            }
            Err(e) => {
                tracing::error!("Could not create page auditor: {}", e);
                let error = e.to_string();
                for page in &crawl.pages {
                    summary.failures += 1;
                    audits.push(PageAuditRecord::Failure {
                        url: page.clone(),
                        error: error.clone(),
                    });
                }
            }
        }

        let start_url = crawl
            .pages
            .first()
            .cloned()
            .or_else(|| normalize_url(start_url, None))
            .unwrap_or_else(|| start_url.to_string());

        tracing::info!(
            "Site audit finished: {} pages, {} succeeded, {} failed, {} violations",
            summary.total_pages,
            summary.successes,
            summary.failures,
            summary.total_violations
        );

        Ok(SiteAuditResult {
            start_url,
            crawl,
            audits,
            summary,
        })
    }
}
