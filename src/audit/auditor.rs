//! Page auditor
//!
//! [`PageAuditor`] is the capability the site runner depends on;
//! [`AccessibilityAuditor`] implements it by driving a browser and a rule
//! engine.

use crate::audit::browser::{Browser, BrowserLauncher, BrowserPage};
use crate::audit::engine::{RuleEngine, WCAG_TAGS};
use crate::audit::types::{AuditOptions, AuditResult, EngineResults};
use crate::{AuditError, AuditOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Timeout applied when [`AuditOptions::timeout`] is not set
pub const DEFAULT_AUDIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Audits single pages
///
/// An instance may be used for many audits in sequence and must be closed
/// once when the caller is done with it.
#[async_trait]
pub trait PageAuditor: Send {
    /// Loads `url` and returns its accessibility audit
    async fn audit(&mut self, url: &str, options: &AuditOptions) -> AuditOutcome<AuditResult>;

    /// Releases every resource held by the auditor
    async fn close(&mut self) -> AuditOutcome<()>;
}

/// Where the document to audit comes from
#[derive(Clone, Copy)]
enum PageSource<'a> {
    Url,
    Html(&'a str),
}

/// [`PageAuditor`] backed by a browser session and a rule engine
///
/// The browser is launched lazily on the first audit and reused until
/// [`close`](PageAuditor::close); auditing after a close launches a new
/// session.
pub struct AccessibilityAuditor {
    launcher: Arc<dyn BrowserLauncher>,
    engine: Arc<dyn RuleEngine>,
    browser: Option<Box<dyn Browser>>,
}

impl AccessibilityAuditor {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, engine: Arc<dyn RuleEngine>) -> Self {
        Self {
            launcher,
            engine,
            browser: None,
        }
    }

    /// Returns true while a browser session is open
    pub fn is_running(&self) -> bool {
        self.browser.is_some()
    }

    /// Audits an HTML string as if it had been served from `url`
    pub async fn audit_html(
        &mut self,
        url: &str,
        html: &str,
        options: &AuditOptions,
    ) -> AuditOutcome<AuditResult> {
        self.run(url, PageSource::Html(html), options).await
    }

    async fn ensure_browser(&mut self) -> AuditOutcome<()> {
        if self.browser.is_none() {
            tracing::info!("Launching browser for accessibility audits");
            self.browser = Some(self.launcher.launch().await?);
        }
        Ok(())
    }

    async fn run(
        &mut self,
        url: &str,
        source: PageSource<'_>,
        options: &AuditOptions,
    ) -> AuditOutcome<AuditResult> {
        self.ensure_browser().await?;
        let browser = self
            .browser
            .as_deref()
            .ok_or_else(|| AuditError::Launch("browser unavailable".to_string()))?;

        let timeout = options.timeout.unwrap_or(DEFAULT_AUDIT_TIMEOUT);
        let deadline = Instant::now() + timeout;
        let timed_out = || AuditError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        };

        tracing::debug!("Auditing {}", url);

        let open = async {
            match source {
                PageSource::Url => browser.open_page(url).await,
                PageSource::Html(html) => browser.load_html(url, html).await,
            }
        };
        let mut page = tokio::time::timeout_at(deadline, open)
            .await
            .map_err(|_| timed_out())??;

        let analyzed = tokio::time::timeout_at(deadline, analyze(self.engine.as_ref(), page.as_ref()))
            .await
            .unwrap_or_else(|_| Err(timed_out()));

        if let Err(e) = page.close().await {
            tracing::warn!("Failed to close page {}: {}", url, e);
        }

        let raw = analyzed?;
        Ok(AuditResult::from_engine(url, raw, options.include_raw))
    }
}

async fn analyze(engine: &dyn RuleEngine, page: &dyn BrowserPage) -> AuditOutcome<EngineResults> {
    engine.analyze(page, WCAG_TAGS).await
}

#[async_trait]
impl PageAuditor for AccessibilityAuditor {
    async fn audit(&mut self, url: &str, options: &AuditOptions) -> AuditOutcome<AuditResult> {
        self.run(url, PageSource::Url, options).await
    }

    async fn close(&mut self) -> AuditOutcome<()> {
        if let Some(mut browser) = self.browser.take() {
            tracing::debug!("Closing browser");
            browser.close().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::types::{EngineNode, EngineRule, Impact};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counters {
        launched: AtomicUsize,
        opened: AtomicUsize,
        pages_closed: AtomicUsize,
        browsers_closed: AtomicUsize,
    }

    struct FakePage {
        url: String,
        html: String,
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl BrowserPage for FakePage {
        fn url(&self) -> &str {
            &self.url
        }

        fn html(&self) -> &str {
            &self.html
        }

        async fn close(&mut self) -> AuditOutcome<()> {
            self.counters.pages_closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FakeBrowser {
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl Browser for FakeBrowser {
        async fn open_page(&self, url: &str) -> AuditOutcome<Box<dyn BrowserPage>> {
            if url.contains("unreachable") {
                return Err(AuditError::Load {
                    url: url.to_string(),
                    message: "HTTP 404 Not Found".to_string(),
                });
            }
            self.load_html(url, "<main></main>").await
        }

        async fn load_html(&self, url: &str, html: &str) -> AuditOutcome<Box<dyn BrowserPage>> {
            self.counters.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakePage {
                url: url.to_string(),
                html: html.to_string(),
                counters: self.counters.clone(),
            }))
        }

        async fn close(&mut self) -> AuditOutcome<()> {
            self.counters.browsers_closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FakeLauncher {
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl BrowserLauncher for FakeLauncher {
        async fn launch(&self) -> AuditOutcome<Box<dyn Browser>> {
            self.counters.launched.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeBrowser {
                counters: self.counters.clone(),
            }))
        }
    }

    /// Reports `image-alt` with one node per `<img`; fails or hangs on request
    struct FakeEngine;

    #[async_trait]
    impl RuleEngine for FakeEngine {
        async fn analyze(
            &self,
            page: &dyn BrowserPage,
            tags: &[&str],
        ) -> AuditOutcome<EngineResults> {
            assert_eq!(tags, WCAG_TAGS);
            if page.url().contains("broken") {
                return Err(AuditError::Engine("engine crashed".to_string()));
            }
            if page.url().contains("slow") {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }

            let images = page.html().matches("<img").count();
            Ok(EngineResults {
                violations: (0..images.min(1))
                    .map(|_| EngineRule {
                        id: "image-alt".to_string(),
                        impact: Some(Impact::Critical),
                        tags: vec!["wcag2a".to_string()],
                        nodes: vec![EngineNode::default(); images],
                        ..Default::default()
                    })
                    .collect(),
                passes: vec![EngineRule::default(); 3],
                incomplete: vec![],
            })
        }
    }

    fn auditor() -> (AccessibilityAuditor, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let launcher = Arc::new(FakeLauncher {
            counters: counters.clone(),
        });
        (AccessibilityAuditor::new(launcher, Arc::new(FakeEngine)), counters)
    }

    #[tokio::test]
    async fn test_browser_launched_lazily_and_reused() {
        let (mut auditor, counters) = auditor();
        assert!(!auditor.is_running());

        auditor
            .audit("https://example.com/", &AuditOptions::default())
            .await
            .unwrap();
        auditor
            .audit("https://example.com/about", &AuditOptions::default())
            .await
            .unwrap();

        assert!(auditor.is_running());
        assert_eq!(counters.launched.load(Ordering::SeqCst), 1);
        assert_eq!(counters.opened.load(Ordering::SeqCst), 2);
        assert_eq!(counters.pages_closed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_audit_html_counts_violations() {
        let (mut auditor, _) = auditor();
        let result = auditor
            .audit_html(
                "https://example.com/snippet",
                r#"<img src="a.png"><img src="b.png">"#,
                &AuditOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(result.url, "https://example.com/snippet");
        assert_eq!(result.summary.total_violations, 1);
        assert_eq!(result.summary.critical_violations, 1);
        assert_eq!(result.summary.total_passes, 3);
        assert_eq!(result.violations[0].nodes.len(), 2);
        assert!(result.raw_engine_output.is_some());
    }

    #[tokio::test]
    async fn test_page_closed_when_engine_fails() {
        let (mut auditor, counters) = auditor();
        let err = auditor
            .audit("https://example.com/broken", &AuditOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::Engine(_)));
        assert_eq!(counters.pages_closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_failure_propagates() {
        let (mut auditor, counters) = auditor();
        let err = auditor
            .audit("https://example.com/unreachable", &AuditOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::Load { .. }));
        assert_eq!(counters.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_closes_page() {
        let (mut auditor, counters) = auditor();
        let options = AuditOptions {
            timeout: Some(Duration::from_millis(500)),
            include_raw: false,
        };

        let err = auditor
            .audit("https://example.com/slow", &options)
            .await
            .unwrap_err();

        match err {
            AuditError::Timeout { url, timeout_ms } => {
                assert_eq!(url, "https://example.com/slow");
                assert_eq!(timeout_ms, 500);
            }
            other => panic!("expected timeout, got {}", other),
        }
        assert_eq!(counters.pages_closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_releases_browser_and_allows_relaunch() {
        let (mut auditor, counters) = auditor();
        auditor
            .audit("https://example.com/", &AuditOptions::default())
            .await
            .unwrap();

        auditor.close().await.unwrap();
        assert!(!auditor.is_running());
        assert_eq!(counters.browsers_closed.load(Ordering::SeqCst), 1);

        // Closing again is a no-op
        auditor.close().await.unwrap();
        assert_eq!(counters.browsers_closed.load(Ordering::SeqCst), 1);

        auditor
            .audit("https://example.com/", &AuditOptions::default())
            .await
            .unwrap();
        assert_eq!(counters.launched.load(Ordering::SeqCst), 2);
    }
}
