//! Page audit module
//!
//! This module turns a URL into a normalized accessibility audit:
//! - Data model for raw engine output and normalized results
//! - Browser and rule engine collaborator traits with default implementations
//! - The [`PageAuditor`] capability and its [`AccessibilityAuditor`] implementation

mod auditor;
mod browser;
mod engine;
mod types;

pub use auditor::{AccessibilityAuditor, PageAuditor, DEFAULT_AUDIT_TIMEOUT};
pub use browser::{Browser, BrowserLauncher, BrowserPage, HttpBrowser, HttpBrowserLauncher, HttpPage};
pub use engine::{CommandRuleEngine, RuleEngine, WCAG_TAGS};
pub use types::{
    AuditOptions, AuditResult, AuditSummary, EngineNode, EngineResults, EngineRule, Impact,
    Violation, ViolationNode, WcagLevel,
};

use crate::config::Config;
use crate::AuditOutcome;
use std::sync::Arc;

/// Builds the default auditor from configuration: an HTTP browser plus the
/// configured external rule engine
pub fn auditor_from_config(config: &Config) -> AuditOutcome<AccessibilityAuditor> {
    let launcher = Arc::new(HttpBrowserLauncher::new(config.user_agent.clone()));
    let engine = Arc::new(CommandRuleEngine::new(&config.auditor.engine_command)?);
    Ok(AccessibilityAuditor::new(launcher, engine))
}
