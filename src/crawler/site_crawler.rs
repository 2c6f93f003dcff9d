//! Breadth-first site crawler
//!
//! The crawler walks the link graph of a site level by level, starting from
//! a seed URL, and returns the pages it visited in visit order together with
//! per-URL fetch errors and a count of links it chose not to follow.

use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::parser::extract_hrefs;
use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::url::{is_http_scheme, normalize_parsed, same_origin};
use crate::ReachError;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Bounds applied to a single crawl
///
/// Build partial option sets with struct update syntax:
///
/// ```
/// use reach::crawler::CrawlOptions;
///
/// let options = CrawlOptions { max_depth: 1, ..Default::default() };
/// assert_eq!(options.max_pages, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlOptions {
    /// Maximum number of pages to visit
    pub max_pages: usize,

    /// Maximum number of link hops from the seed
    pub max_depth: u32,

    /// Pause between fetches (milliseconds)
    pub delay_ms: u64,

    /// Only follow links sharing the seed's origin
    pub same_origin: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: 20,
            max_depth: 2,
            delay_ms: 0,
            same_origin: true,
        }
    }
}

impl From<&CrawlerConfig> for CrawlOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            max_depth: config.max_depth,
            delay_ms: config.delay_ms,
            same_origin: config.same_origin,
        }
    }
}

/// A page that could not be fetched during the crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlError {
    /// The URL that failed
    pub url: String,

    /// Error message (`HTTP <status> <reason>` or the network error)
    pub error: String,
}

/// Outcome of one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Normalized URLs in visit order
    pub pages: Vec<String>,

    /// Pages that were visited but could not be fetched
    pub errors: Vec<CrawlError>,

    /// Links dropped by scheme, origin or duplicate policy
    pub skipped: usize,
}

/// A URL waiting in the frontier
#[derive(Debug, Clone)]
struct QueueItem {
    url: Url,
    depth: u32,
}

/// Per-call traversal state; never shared between crawls
#[derive(Default)]
struct CrawlState {
    queue: VecDeque<QueueItem>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    result: CrawlResult,
}

impl CrawlState {
    fn enqueue(&mut self, item: QueueItem) {
        self.queued.insert(item.url.as_str().to_string());
        self.queue.push_back(item);
    }

    fn dequeue(&mut self) -> Option<QueueItem> {
        let item = self.queue.pop_front()?;
        self.queued.remove(item.url.as_str());
        Some(item)
    }

    fn is_known(&self, url: &str) -> bool {
        self.visited.contains(url) || self.queued.contains(url)
    }
}

/// Breadth-first crawler over a [`Fetcher`]
///
/// Fetches are issued one at a time in queue order, so the page list of a
/// crawl is deterministic for a fixed set of responses.
#[derive(Clone)]
pub struct SiteCrawler {
    fetcher: Arc<dyn Fetcher>,
}

impl SiteCrawler {
    /// Creates a crawler over the given fetch collaborator
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Creates a crawler that fetches over HTTP with the configured user agent
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(Arc::new(HttpFetcher::from_config(config)?)))
    }

    /// Crawls a site starting from `start_url`
    ///
    /// # Algorithm
    ///
    /// 1. Seed the queue with the normalized start URL at depth 0
    /// 2. While the queue has work and fewer than `max_pages` pages were visited:
    ///    a. Dequeue; skip if already visited
    ///    b. Mark visited and record the page (even if the fetch fails)
    ///    c. Fetch; record HTTP and network failures in `errors`
    ///    d. Below `max_depth`, extract links and enqueue new same-policy URLs
    ///    e. Sleep `delay_ms` if more work is pending
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - The crawl ran to completion
    /// * `Err(ReachError::InvalidStartUrl)` - The seed could not be parsed
    pub async fn crawl(
        &self,
        start_url: &str,
        options: &CrawlOptions,
    ) -> Result<CrawlResult, ReachError> {
        let start = normalize_parsed(start_url, None)
            .ok_or_else(|| ReachError::InvalidStartUrl(start_url.to_string()))?;

        tracing::info!(
            "Starting crawl of {} (max pages: {}, max depth: {}, same origin: {})",
            start,
            options.max_pages,
            options.max_depth,
            options.same_origin
        );

        let mut state = CrawlState::default();
        state.enqueue(QueueItem {
            url: start.clone(),
            depth: 0,
        });

        while state.result.pages.len() < options.max_pages {
            let current = match state.dequeue() {
                Some(item) => item,
                None => break,
            };

            let url_str = current.url.as_str().to_string();
            if state.visited.contains(&url_str) {
                continue;
            }

            state.visited.insert(url_str.clone());
            state.result.pages.push(url_str.clone());
            tracing::debug!("Visiting {} (depth {})", url_str, current.depth);

            let fetched = self.fetcher.fetch(&url_str).await;
            if let Some(error) = fetched.error_message() {
                tracing::warn!("Failed to fetch {}: {}", url_str, error);
                state.result.errors.push(CrawlError {
                    url: url_str.clone(),
                    error,
                });
            }

            if let Some(body) = fetched.body() {
                if current.depth < options.max_depth {
                    self.follow_links(&mut state, &current, body, &start, options);
                }
            }

            let more_work =
                !state.queue.is_empty() && state.result.pages.len() < options.max_pages;
            if options.delay_ms > 0 && more_work {
                tokio::time::sleep(Duration::from_millis(options.delay_ms)).await;
            }
        }

        tracing::info!(
            "Crawl finished: {} pages, {} errors, {} links skipped",
            state.result.pages.len(),
            state.result.errors.len(),
            state.result.skipped
        );

        Ok(state.result)
    }

    /// Applies link policy to every href on a page and enqueues the survivors
    fn follow_links(
        &self,
        state: &mut CrawlState,
        current: &QueueItem,
        body: &str,
        start: &Url,
        options: &CrawlOptions,
    ) {
        for href in extract_hrefs(body) {
            let link = match normalize_parsed(&href, Some(&current.url)) {
                Some(link) => link,
                None => {
                    tracing::debug!("Ignoring unparseable link {:?} on {}", href, current.url);
                    continue;
                }
            };

            if !is_http_scheme(&link) {
                tracing::debug!("Skipping non-HTTP link {}", link);
                state.result.skipped += 1;
                continue;
            }

            if options.same_origin && !same_origin(&link, start) {
                tracing::debug!("Skipping cross-origin link {}", link);
                state.result.skipped += 1;
                continue;
            }

            if state.is_known(link.as_str()) {
                state.result.skipped += 1;
                continue;
            }

            state.enqueue(QueueItem {
                url: link,
                depth: current.depth + 1,
            });
        }
    }
}
