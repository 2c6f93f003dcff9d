//! Browser collaborator
//!
//! The auditor only needs a browser that can open a page (by URL or from an
//! HTML string) and hand the loaded document to the rule engine. The
//! [`HttpBrowser`] here loads documents over HTTP and does not execute page
//! scripts; richer engines plug in through the same traits.

use crate::config::UserAgentConfig;
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::{AuditError, AuditOutcome};
use async_trait::async_trait;
use reqwest::Client;

/// A loaded document that can be analyzed
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// URL the page was loaded from (or stands in for)
    fn url(&self) -> &str;

    /// Markup of the loaded document
    fn html(&self) -> &str;

    /// Releases the page
    async fn close(&mut self) -> AuditOutcome<()>;
}

/// A running browser session
#[async_trait]
pub trait Browser: Send + Sync {
    /// Opens a new page and navigates it to `url`
    async fn open_page(&self, url: &str) -> AuditOutcome<Box<dyn BrowserPage>>;

    /// Opens a new page with `html` as its content
    async fn load_html(&self, url: &str, html: &str) -> AuditOutcome<Box<dyn BrowserPage>>;

    /// Shuts the session down
    async fn close(&mut self) -> AuditOutcome<()>;
}

/// Starts browser sessions on demand
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> AuditOutcome<Box<dyn Browser>>;
}

/// A page loaded by [`HttpBrowser`]
#[derive(Debug, Clone)]
pub struct HttpPage {
    url: String,
    html: String,
}

#[async_trait]
impl BrowserPage for HttpPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn html(&self) -> &str {
        &self.html
    }

    async fn close(&mut self) -> AuditOutcome<()> {
        self.html.clear();
        Ok(())
    }
}

/// Browser that loads documents over HTTP without running scripts
#[derive(Debug, Clone)]
pub struct HttpBrowser {
    client: Client,
}

impl HttpBrowser {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn open_page(&self, url: &str) -> AuditOutcome<Box<dyn BrowserPage>> {
        match fetch_url(&self.client, url).await {
            FetchResult::Success { body, .. } => Ok(Box::new(HttpPage {
                url: url.to_string(),
                html: body,
            })),
            failed => Err(AuditError::Load {
                url: url.to_string(),
                message: failed
                    .error_message()
                    .unwrap_or_else(|| "no content".to_string()),
            }),
        }
    }

    async fn load_html(&self, url: &str, html: &str) -> AuditOutcome<Box<dyn BrowserPage>> {
        Ok(Box::new(HttpPage {
            url: url.to_string(),
            html: html.to_string(),
        }))
    }

    async fn close(&mut self) -> AuditOutcome<()> {
        Ok(())
    }
}

/// Launches [`HttpBrowser`] sessions with the configured user agent
#[derive(Debug, Clone, Default)]
pub struct HttpBrowserLauncher {
    user_agent: UserAgentConfig,
}

impl HttpBrowserLauncher {
    pub fn new(user_agent: UserAgentConfig) -> Self {
        Self { user_agent }
    }
}

#[async_trait]
impl BrowserLauncher for HttpBrowserLauncher {
    async fn launch(&self) -> AuditOutcome<Box<dyn Browser>> {
        let client =
            build_http_client(&self.user_agent).map_err(|e| AuditError::Launch(e.to_string()))?;
        tracing::debug!("Launched HTTP browser as {}", self.user_agent.header_value());
        Ok(Box::new(HttpBrowser::new(client)))
    }
}
