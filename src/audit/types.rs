//! Audit data model
//!
//! Two families of types live here: the raw output of the rule engine
//! (`Engine*`, mirroring the engine's JSON) and the normalized audit result
//! the rest of the crate works with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Severity tier of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Critical,
    Serious,
    Moderate,
    Minor,
}

impl Impact {
    /// All impacts, most severe first
    pub const ALL: [Impact; 4] = [
        Impact::Critical,
        Impact::Serious,
        Impact::Moderate,
        Impact::Minor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Critical => "critical",
            Impact::Serious => "serious",
            Impact::Moderate => "moderate",
            Impact::Minor => "minor",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WCAG conformance tier a violated rule maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    #[serde(rename = "WCAG 2.0 A")]
    Wcag20A,
    #[serde(rename = "WCAG 2.0 AA")]
    Wcag20AA,
    #[serde(rename = "WCAG 2.1 A")]
    Wcag21A,
    #[serde(rename = "WCAG 2.1 AA")]
    Wcag21AA,
    Other,
}

impl WcagLevel {
    /// Picks the level for a rule's tag set
    ///
    /// Priority: 2.1 AA > 2.0 AA > 2.1 A > 2.0 A > Other.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        let has = |wanted: &str| tags.iter().any(|t| t.as_ref() == wanted);

        if has("wcag21aa") {
            WcagLevel::Wcag21AA
        } else if has("wcag2aa") {
            WcagLevel::Wcag20AA
        } else if has("wcag21a") {
            WcagLevel::Wcag21A
        } else if has("wcag2a") {
            WcagLevel::Wcag20A
        } else {
            WcagLevel::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WcagLevel::Wcag20A => "WCAG 2.0 A",
            WcagLevel::Wcag20AA => "WCAG 2.0 AA",
            WcagLevel::Wcag21A => "WCAG 2.1 A",
            WcagLevel::Wcag21AA => "WCAG 2.1 AA",
            WcagLevel::Other => "Other",
        }
    }
}

impl fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DOM node reported by the rule engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineNode {
    pub target: Vec<String>,
    pub html: String,
    pub failure_summary: Option<String>,
    pub impact: Option<String>,
}

/// A rule as reported by the rule engine (violation, pass or incomplete)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRule {
    pub id: String,
    #[serde(default)]
    pub impact: Option<Impact>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub help_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<EngineNode>,
}

/// Raw output of one rule engine run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineResults {
    pub violations: Vec<EngineRule>,
    pub passes: Vec<EngineRule>,
    pub incomplete: Vec<EngineRule>,
}

/// A node affected by a violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationNode {
    pub target: Vec<String>,
    pub html: String,
    pub failure_summary: String,
    pub impact: String,
}

impl From<&EngineNode> for ViolationNode {
    fn from(node: &EngineNode) -> Self {
        Self {
            target: node.target.clone(),
            html: node.html.clone(),
            failure_summary: node.failure_summary.clone().unwrap_or_default(),
            impact: node.impact.clone().unwrap_or_default(),
        }
    }
}

/// A normalized accessibility violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: String,
    pub impact: Impact,
    pub description: String,
    pub help: String,
    pub help_url: String,
    pub wcag_level: WcagLevel,
    pub nodes: Vec<ViolationNode>,
}

impl From<&EngineRule> for Violation {
    /// Missing impacts default to `minor`
    fn from(rule: &EngineRule) -> Self {
        Self {
            id: rule.id.clone(),
            impact: rule.impact.unwrap_or(Impact::Minor),
            description: rule.description.clone(),
            help: rule.help.clone(),
            help_url: rule.help_url.clone(),
            wcag_level: WcagLevel::from_tags(&rule.tags),
            nodes: rule.nodes.iter().map(ViolationNode::from).collect(),
        }
    }
}

/// Counts for one page audit
///
/// `total_violations` always equals the sum of the four impact counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub total_violations: usize,
    pub critical_violations: usize,
    pub serious_violations: usize,
    pub moderate_violations: usize,
    pub minor_violations: usize,
    pub total_passes: usize,
    pub incomplete: usize,
}

impl AuditSummary {
    /// Builds a summary from normalized violations and rule counts
    pub fn new(violations: &[Violation], total_passes: usize, incomplete: usize) -> Self {
        let count = |impact: Impact| violations.iter().filter(|v| v.impact == impact).count();

        let critical_violations = count(Impact::Critical);
        let serious_violations = count(Impact::Serious);
        let moderate_violations = count(Impact::Moderate);
        let minor_violations = count(Impact::Minor);

        Self {
            total_violations: critical_violations
                + serious_violations
                + moderate_violations
                + minor_violations,
            critical_violations,
            serious_violations,
            moderate_violations,
            minor_violations,
            total_passes,
            incomplete,
        }
    }

    /// Returns the count for one impact tier
    pub fn count_for(&self, impact: Impact) -> usize {
        match impact {
            Impact::Critical => self.critical_violations,
            Impact::Serious => self.serious_violations,
            Impact::Moderate => self.moderate_violations,
            Impact::Minor => self.minor_violations,
        }
    }
}

/// Result of auditing one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub url: String,
    /// RFC 3339 timestamp of when the audit completed
    pub timestamp: String,
    pub summary: AuditSummary,
    pub violations: Vec<Violation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_engine_output: Option<EngineResults>,
}

impl AuditResult {
    /// Normalizes raw engine output into an audit result stamped now
    pub fn from_engine(url: &str, raw: EngineResults, include_raw: bool) -> Self {
        let violations: Vec<Violation> = raw.violations.iter().map(Violation::from).collect();
        let summary = AuditSummary::new(&violations, raw.passes.len(), raw.incomplete.len());

        Self {
            url: url.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary,
            violations,
            raw_engine_output: include_raw.then_some(raw),
        }
    }
}

/// Options for a single page audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOptions {
    /// Soft bound on loading and analyzing the page; `None` uses the
    /// auditor's default
    pub timeout: Option<Duration>,

    /// Keep the raw engine output on the result
    pub include_raw: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            include_raw: true,
        }
    }
}
