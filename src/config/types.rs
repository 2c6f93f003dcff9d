use serde::Deserialize;

/// Main configuration structure for Reach
///
/// Every section is optional in the TOML file; missing keys fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub auditor: AuditorConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages to visit and audit
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum link depth from the start URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Pause between crawl requests (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Only follow links on the start URL's origin
    #[serde(rename = "same-origin")]
    pub same_origin: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 20,
            max_depth: 2,
            delay_ms: 0,
            same_origin: true,
        }
    }
}

/// Page auditor configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditorConfig {
    /// Per-page audit timeout (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Rule engine program followed by its fixed arguments
    #[serde(rename = "engine-command")]
    pub engine_command: Vec<String>,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            engine_command: vec!["reach-axe".to_string()],
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name sent in the User-Agent header
    pub name: String,

    /// Version sent in the User-Agent header
    pub version: String,

    /// URL with information about the auditor
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "reach".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!("{}/{} (+{})", self.name, self.version, contact),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}
