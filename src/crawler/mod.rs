//! Crawler module for site discovery
//!
//! This module contains the crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] collaborator trait
//! - HTML link extraction
//! - Breadth-first traversal with page, depth and origin bounds

mod fetcher;
mod parser;
mod site_crawler;

pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher, HttpFetcher};
pub use parser::extract_hrefs;
pub use site_crawler::{CrawlError, CrawlOptions, CrawlResult, SiteCrawler};
