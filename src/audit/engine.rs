//! Rule engine collaborator
//!
//! The rule engine inspects a loaded page and reports violations, passes
//! and incomplete checks. [`CommandRuleEngine`] delegates to an external
//! program that speaks the engine's JSON format on stdout.

use crate::audit::browser::BrowserPage;
use crate::audit::types::EngineResults;
use crate::{AuditError, AuditOutcome};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Rule tags every audit is filtered to: WCAG 2.0/2.1, levels A and AA
pub const WCAG_TAGS: &[&str] = &["wcag2a", "wcag2aa", "wcag21a", "wcag21aa"];

/// Analyzes a loaded page
#[async_trait]
pub trait RuleEngine: Send + Sync {
    async fn analyze(&self, page: &dyn BrowserPage, tags: &[&str]) -> AuditOutcome<EngineResults>;
}

/// Rule engine running as an external process
///
/// The program is invoked as
/// `<program> <args...> --tags <comma separated tags> --url <page url>`,
/// receives the page markup on stdin and must print [`EngineResults`] JSON
/// on stdout. A non-zero exit status is an engine failure.
#[derive(Debug, Clone)]
pub struct CommandRuleEngine {
    program: String,
    args: Vec<String>,
}

impl CommandRuleEngine {
    /// Builds an engine from a program followed by its fixed arguments
    pub fn new(command: &[String]) -> AuditOutcome<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| AuditError::Engine("engine command is empty".to_string()))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

#[async_trait]
impl RuleEngine for CommandRuleEngine {
    async fn analyze(&self, page: &dyn BrowserPage, tags: &[&str]) -> AuditOutcome<EngineResults> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("--tags")
            .arg(tags.join(","))
            .arg("--url")
            .arg(page.url())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AuditError::Engine(format!("failed to start {}: {}", self.program, e)))?;

        let html = page.html().to_string();
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // Engines that load the URL themselves may close stdin early
                if let Err(e) = stdin.write_all(html.as_bytes()).await {
                    tracing::debug!("Rule engine did not read page markup: {}", e);
                }
            }
        };

        let (_, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AuditError::Engine(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| AuditError::Engine(format!("invalid engine output: {}", e)))
    }
}
