//! Per-URL scraper classification policy.

use regex::Regex;
use url::Url;

use newsgraph_shared::ScraperKind;

/// Classifies a URL into the [`ScraperKind`] that should fetch it.
///
/// The rule is injectable: the pipeline takes any implementation, and nothing
/// downstream depends on how the choice was made.
pub trait ScraperPolicy: Send + Sync {
    fn classify(&self, url: &Url) -> ScraperKind;
}

/// Default policy: hosts matching any configured pattern go to the local
/// HTML scraper; everything else goes to the reader API.
pub struct DomainPatternPolicy {
    html_hosts: Vec<Regex>,
}

impl DomainPatternPolicy {
    /// Build from glob-like host patterns (e.g. `*.substack.com`).
    /// Patterns that fail to compile are dropped.
    pub fn new(patterns: &[String]) -> Self {
        Self {
            html_hosts: patterns.iter().filter_map(|p| glob_to_regex(p)).collect(),
        }
    }
}

impl ScraperPolicy for DomainPatternPolicy {
    fn classify(&self, url: &Url) -> ScraperKind {
        let host = url.host_str().unwrap_or("");
        if self.html_hosts.iter().any(|p| p.is_match(host)) {
            ScraperKind::Html
        } else {
            ScraperKind::Reader
        }
    }
}

/// Convert a glob-like pattern to a regex.
fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let escaped = regex::escape(pattern)
        .replace(r"\*\*", ".*")
        .replace(r"\*", "[^.]*")
        .replace(r"\?", ".");
    Regex::new(&format!("^{escaped}$")).ok()
}
