//! Integration tests for site audits
//!
//! A wiremock server plays the site; page audits are answered either by a
//! scripted auditor or, on unix, by the HTTP browser plus a shell rule engine.

use async_trait::async_trait;
use reach::audit::{
    AuditOptions, AuditResult, EngineNode, EngineResults, EngineRule, Impact, PageAuditor,
};
use reach::config::UserAgentConfig;
use reach::site_audit::{AuditorFactory, PageAuditRecord, SiteAuditOptions, SiteAuditRunner};
use reach::{AuditError, AuditOutcome, SiteCrawler};
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<html><body>{}</body></html>", body))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn crawler() -> SiteCrawler {
    SiteCrawler::from_config(&UserAgentConfig::default()).expect("Failed to build crawler")
}

/// Answers audits from a fixed map of URL to violations; any other URL fails
struct ScriptedAuditor {
    scenarios: Arc<HashMap<String, Vec<EngineRule>>>,
}

#[async_trait]
impl PageAuditor for ScriptedAuditor {
    async fn audit(&mut self, url: &str, options: &AuditOptions) -> AuditOutcome<AuditResult> {
        let violations = self
            .scenarios
            .get(url)
            .cloned()
            .ok_or_else(|| AuditError::Engine(format!("no scenario for {}", url)))?;

        let raw = EngineResults {
            violations,
            ..Default::default()
        };
        Ok(AuditResult::from_engine(url, raw, options.include_raw))
    }

    async fn close(&mut self) -> AuditOutcome<()> {
        Ok(())
    }
}

fn scripted(scenarios: HashMap<String, Vec<EngineRule>>) -> AuditorFactory {
    let scenarios = Arc::new(scenarios);
    Box::new(move || -> AuditOutcome<Box<dyn PageAuditor>> {
        Ok(Box::new(ScriptedAuditor {
            scenarios: scenarios.clone(),
        }))
    })
}

fn color_contrast(nodes: usize) -> EngineRule {
    EngineRule {
        id: "color-contrast".to_string(),
        impact: Some(Impact::Serious),
        description: "Elements must have sufficient color contrast".to_string(),
        help: "Elements must have sufficient color contrast".to_string(),
        help_url: "https://dequeuniversity.com/rules/axe/color-contrast".to_string(),
        tags: vec!["wcag2aa".to_string()],
        nodes: vec![EngineNode::default(); nodes],
    }
}

#[tokio::test]
async fn test_unscripted_page_fails_without_stopping_run() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/missing">Missing</a>"#).await;
    mount_page(&server, "/missing", "Exists, but has no scenario").await;

    let mut scenarios = HashMap::new();
    scenarios.insert(format!("{}/", base), vec![]);

    let runner = SiteAuditRunner::new(crawler(), scripted(scenarios));
    let result = runner.run(&base, &SiteAuditOptions::default()).await.unwrap();

    assert_eq!(result.summary.successes, 1);
    assert_eq!(result.summary.failures, 1);
    assert_eq!(result.audits.len(), 2);

    match &result.audits[1] {
        PageAuditRecord::Failure { url, .. } => assert_eq!(url, &format!("{}/missing", base)),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_overview_across_pages() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/about">About</a>"#).await;
    mount_page(&server, "/about", "About").await;

    let mut scenarios = HashMap::new();
    scenarios.insert(format!("{}/", base), vec![color_contrast(2)]);
    scenarios.insert(format!("{}/about", base), vec![color_contrast(1)]);

    let runner = SiteAuditRunner::new(crawler(), scripted(scenarios));
    let result = runner.run(&base, &SiteAuditOptions::default()).await.unwrap();

    assert_eq!(result.start_url, format!("{}/", base));
    assert_eq!(result.summary.total_violations, 2);

    let overview = result.overview();
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].id, "color-contrast");
    assert_eq!(overview[0].total_occurrences, 3);
    assert_eq!(overview[0].pages[0].url, format!("{}/", base));
    assert_eq!(overview[0].pages[0].occurrences, 2);
    assert_eq!(overview[0].pages[1].url, format!("{}/about", base));
    assert_eq!(overview[0].pages[1].occurrences, 1);
    assert!(overview[0].is_structural());
}

#[tokio::test]
async fn test_crawl_errors_kept_apart_from_audit_failures() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/gone">Gone</a>"#).await;

    let mut scenarios = HashMap::new();
    scenarios.insert(format!("{}/", base), vec![]);
    scenarios.insert(format!("{}/gone", base), vec![]);

    let runner = SiteAuditRunner::new(crawler(), scripted(scenarios));
    let result = runner.run(&base, &SiteAuditOptions::default()).await.unwrap();

    // /gone could not be fetched by the crawler but the auditor still ran
    assert_eq!(result.crawl.errors.len(), 1);
    assert_eq!(result.crawl.errors[0].error, "HTTP 404 Not Found");
    assert_eq!(result.summary.failures, 0);
    assert_eq!(result.audits.len(), result.crawl.pages.len());
}

#[cfg(unix)]
mod with_rule_engine {
    use super::*;
    use reach::audit::auditor_from_config;
    use reach::config::Config;

    /// Reports `image-alt` whenever the page markup contains an image
    const ENGINE: &str = r#"
html=$(cat)
case "$html" in
  *"<img"*)
    echo '{"violations":[{"id":"image-alt","impact":"critical","description":"Images must have alternate text","help":"Add alt text","helpUrl":"https://dequeuniversity.com/rules/axe/image-alt","tags":["wcag2a"],"nodes":[{"target":["img"],"html":"<img>"}]}],"passes":[],"incomplete":[]}'
    ;;
  *)
    echo '{"violations":[],"passes":[{"id":"document-title"}],"incomplete":[]}'
    ;;
esac
"#;

    fn config() -> Config {
        let mut config = Config::default();
        config.auditor.engine_command = vec![
            "sh".to_string(),
            "-c".to_string(),
            ENGINE.to_string(),
            "reach-engine".to_string(),
        ];
        config
    }

    #[tokio::test]
    async fn test_site_audit_end_to_end() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount_page(&server, "/", r#"<a href="/gallery">Gallery</a> <a href="/gone">Gone</a>"#).await;
        mount_page(&server, "/gallery", r#"<img src="cat.png">"#).await;

        let config = config();
        let runner = SiteAuditRunner::new(
            crawler(),
            Box::new(move || -> AuditOutcome<Box<dyn PageAuditor>> {
                Ok(Box::new(auditor_from_config(&config)?))
            }),
        );

        let result = runner.run(&base, &SiteAuditOptions::default()).await.unwrap();

        assert_eq!(result.summary.total_pages, 3);
        assert_eq!(result.summary.successes, 2);
        assert_eq!(result.summary.failures, 1);
        assert_eq!(result.summary.total_violations, 1);

        match &result.audits[2] {
            PageAuditRecord::Failure { url, error } => {
                assert_eq!(url, &format!("{}/gone", base));
                assert!(error.contains("HTTP 404 Not Found"), "unexpected error: {}", error);
            }
            other => panic!("expected failure, got {:?}", other),
        }

        let overview = result.overview();
        assert_eq!(overview.len(), 1);
        assert_eq!(overview[0].id, "image-alt");
        assert!(!overview[0].is_structural());
    }

    #[tokio::test]
    async fn test_single_page_audit_keeps_raw_output() {
        let server = MockServer::start().await;
        mount_page(&server, "/", "<p>No images here</p>").await;

        let mut auditor = auditor_from_config(&config()).unwrap();
        let result = auditor
            .audit(&format!("{}/", server.uri()), &AuditOptions::default())
            .await
            .unwrap();
        auditor.close().await.unwrap();

        assert_eq!(result.summary.total_violations, 0);
        assert_eq!(result.summary.total_passes, 1);
        assert!(result.raw_engine_output.is_some());
    }
}
