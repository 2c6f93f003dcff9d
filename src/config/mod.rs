//! Configuration module for Reach
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use reach::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("reach.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AuditorConfig, Config, CrawlerConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
