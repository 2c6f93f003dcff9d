//! Reach: site-wide accessibility auditing
//!
//! This crate crawls a website breadth-first, audits every discovered page
//! through a browser and an accessibility rule engine, and aggregates the
//! violations it finds into a cross-page overview.

pub mod audit;
pub mod config;
pub mod crawler;
pub mod output;
pub mod site_audit;
pub mod url;

use thiserror::Error;

/// Main error type for Reach operations
#[derive(Debug, Error)]
pub enum ReachError {
    #[error("Invalid start URL: {0}")]
    InvalidStartUrl(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while auditing a single page
///
/// The display form of these errors is what a failed page records in its
/// audit entry, so messages name the page where one is known.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to load {url}: {message}")]
    Load { url: String, message: String },

    #[error("Rule engine failed: {0}")]
    Engine(String),

    #[error("Audit of {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Reach operations
pub type Result<T> = std::result::Result<T, ReachError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for page audit operations
pub type AuditOutcome<T> = std::result::Result<T, AuditError>;

// Re-export commonly used types
pub use audit::{AccessibilityAuditor, AuditResult, PageAuditor, Violation};
pub use config::Config;
pub use crawler::{CrawlOptions, CrawlResult, SiteCrawler};
pub use site_audit::{aggregate_violations, SiteAuditOptions, SiteAuditResult, SiteAuditRunner};
pub use url::normalize_url;
