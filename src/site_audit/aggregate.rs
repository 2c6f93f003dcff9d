//! Cross-page violation overview
//!
//! Groups the violations of every successfully audited page by rule id so
//! that issues repeated across a site's shared templates stand out from
//! one-off content problems.

use crate::audit::{Impact, WcagLevel};
use crate::site_audit::types::PageAuditRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How many of a violation's occurrences fell on one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOccurrences {
    pub url: String,
    pub occurrences: usize,
}

/// One rule's occurrences across the whole site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationOverviewEntry {
    pub id: String,
    pub description: String,
    pub impact: Impact,
    pub help_url: String,
    pub wcag_level: WcagLevel,
    pub total_occurrences: usize,
    /// Sorted by occurrences descending, then URL ascending
    pub pages: Vec<PageOccurrences>,
}

/// Whether a violation repeats across pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationScope {
    /// Found on more than one page: likely a shared template or component
    Structural,
    /// Found on exactly one page
    Isolated,
}

impl fmt::Display for ViolationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationScope::Structural => f.write_str("structural"),
            ViolationScope::Isolated => f.write_str("isolated"),
        }
    }
}

impl ViolationOverviewEntry {
    pub fn scope(&self) -> ViolationScope {
        if self.pages.len() > 1 {
            ViolationScope::Structural
        } else {
            ViolationScope::Isolated
        }
    }

    pub fn is_structural(&self) -> bool {
        self.scope() == ViolationScope::Structural
    }
}

struct Accumulator<'a> {
    first_seen: &'a crate::audit::Violation,
    total: usize,
    per_page: HashMap<&'a str, usize>,
}

/// Builds the violation overview for a set of page audits
///
/// Failed audits are ignored. Each violation on a page counts as
/// `max(node count, 1)` occurrences. Entries keep the metadata of the first
/// occurrence seen for their id and are ordered by total occurrences
/// descending, then by number of affected pages descending, then by id.
///
/// # Example
///
/// ```
/// use reach::site_audit::aggregate_violations;
///
/// assert!(aggregate_violations(&[]).is_empty());
/// ```
pub fn aggregate_violations(audits: &[PageAuditRecord]) -> Vec<ViolationOverviewEntry> {
    let mut by_id: HashMap<&str, Accumulator<'_>> = HashMap::new();

    for record in audits {
        let (url, result) = match record {
            PageAuditRecord::Success { url, result } => (url.as_str(), result),
            PageAuditRecord::Failure { .. } => continue,
        };

        for violation in &result.violations {
            let occurrences = violation.nodes.len().max(1);

            let entry = by_id
                .entry(violation.id.as_str())
                .or_insert_with(|| Accumulator {
                    first_seen: violation,
                    total: 0,
                    per_page: HashMap::new(),
                });

            entry.total += occurrences;
            *entry.per_page.entry(url).or_insert(0) += occurrences;
        }
    }

    let mut overview: Vec<ViolationOverviewEntry> = by_id
        .into_values()
        .map(|acc| {
            let mut pages: Vec<PageOccurrences> = acc
                .per_page
                .into_iter()
                .map(|(url, occurrences)| PageOccurrences {
                    url: url.to_string(),
                    occurrences,
                })
                .collect();
            pages.sort_by(|a, b| {
                b.occurrences
                    .cmp(&a.occurrences)
                    .then_with(|| a.url.cmp(&b.url))
            });

            let meta = acc.first_seen;
            ViolationOverviewEntry {
                id: meta.id.clone(),
                description: meta.description.clone(),
                impact: meta.impact,
                help_url: meta.help_url.clone(),
                wcag_level: meta.wcag_level,
                total_occurrences: acc.total,
                pages,
            }
        })
        .collect();

    overview.sort_by(|a, b| {
        b.total_occurrences
            .cmp(&a.total_occurrences)
            .then_with(|| b.pages.len().cmp(&a.pages.len()))
            .then_with(|| a.id.cmp(&b.id))
    });

    overview
}
