//! Core domain types for NewsGraph pipeline runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for pipeline run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Run log
// ---------------------------------------------------------------------------

/// Severity of a run log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// One append-only entry in a run's log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scraper kind & search strategy
// ---------------------------------------------------------------------------

/// Which scraper implementation handles a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScraperKind {
    /// Text extraction via the hosted reader API.
    Reader,
    /// Direct fetch + local HTML content extraction.
    Html,
}

impl ScraperKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Html => "html",
        }
    }
}

impl std::fmt::Display for ScraperKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which URL-generation search strategy a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Broad search via the general-purpose engine.
    General,
    /// Context-specific search via the research-oriented engine.
    Contextual,
}

impl SearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Contextual => "contextual",
        }
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ArticleRecord — the structured record extracted from one article
// ---------------------------------------------------------------------------

/// Structured knowledge extracted from a single article.
///
/// Every collection defaults to empty so that a completion which omits an
/// entity category still parses. Keys are snake_case in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub article: ArticleMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stakeholders: Vec<Stakeholder>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facts: Vec<Fact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<DocumentRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controversies: Vec<Controversy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub institutions: Vec<Institution>,
}

/// Article-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleMeta {
    pub title: String,
    pub url: String,
    /// Publication date as reported by the article (`mm/dd/yyyy`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_published: Option<String>,
}

/// A person or organization mentioned in the article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stakeholder {
    pub name: String,
    pub kind: StakeholderKind,
    #[serde(default)]
    pub relationships: StakeholderRelations,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quotes: Vec<Quote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeholderKind {
    Person,
    Organization,
}

/// Relationships a stakeholder has to other extracted entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StakeholderRelations {
    /// Title of the article the stakeholder is mentioned in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentioned_in: Option<String>,
    /// Set when the stakeholder authored the article.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_employed_by: Option<String>,
    /// Institution the stakeholder holds a role in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_role_in: Option<String>,
    /// The specific role held within that institution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_role: Option<String>,
    /// Event titles the stakeholder participated in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participated_in: Vec<String>,
    /// Controversy the stakeholder is related to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_to: Option<String>,
}

/// A quote attributed to a stakeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_recorded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub fact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
}

/// A document mentioned in the article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controversy {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: ControversyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControversyKind {
    Legal,
    Social,
    Moral,
}

/// A governmental, regulatory, economic, political, educational, social, or
/// military institution. The taxonomy is free-form text from extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

// ---------------------------------------------------------------------------
// ReviewVerdict
// ---------------------------------------------------------------------------

/// The reviewer's judgment over one extracted record.
///
/// Total by construction: a record is either valid, or invalid with at least
/// one reason. There is no free-text "looks valid" middle ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewVerdict {
    pub valid: bool,
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl ReviewVerdict {
    pub fn approve() -> Self {
        Self {
            valid: true,
            reasons: Vec::new(),
        }
    }

    pub fn reject(reasons: Vec<String>) -> Self {
        Self {
            valid: false,
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_roundtrip() {
        let id = RunId::new();
        let s = id.to_string();
        let parsed: RunId = s.parse().expect("parse RunId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn record_roundtrip() {
        let record = ArticleRecord {
            article: ArticleMeta {
                title: "Council approves housing plan".into(),
                url: "https://news.example.com/housing".into(),
                date_published: Some("03/14/2025".into()),
            },
            stakeholders: vec![Stakeholder {
                name: "Jane Rivera".into(),
                kind: StakeholderKind::Person,
                relationships: StakeholderRelations {
                    mentioned_in: Some("Council approves housing plan".into()),
                    has_role_in: Some("City Council".into()),
                    has_role: Some("Council Member".into()),
                    ..Default::default()
                },
                quotes: vec![Quote {
                    text: "This is a first step.".into(),
                    date_recorded: Some("03/14/2025".into()),
                    context: Some("Remarks after the vote".into()),
                }],
            }],
            events: vec![],
            facts: vec![Fact {
                fact: "The plan allocates 1,200 units.".into(),
                summary: Some("1,200 units allocated".into()),
                description: None,
            }],
            issues: vec![Issue {
                title: "Affordable Housing".into(),
                objective: Some("Increase unit supply".into()),
            }],
            documents: vec![],
            controversies: vec![Controversy {
                summary: "Dispute over zoning exemptions".into(),
                description: None,
                kind: ControversyKind::Legal,
            }],
            institutions: vec![Institution {
                name: "City Council".into(),
                kind: Some("local legislative governmental institution".into()),
            }],
        };

        let json = serde_json::to_string_pretty(&record).expect("serialize");
        let parsed: ArticleRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, record);
    }

    #[test]
    fn record_parses_with_missing_categories() {
        // A completion that only found the article metadata should still parse.
        let json = r#"{
            "article": {"title": "Short piece", "url": "https://a.example/1"}
        }"#;
        let parsed: ArticleRecord = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.article.title, "Short piece");
        assert!(parsed.stakeholders.is_empty());
        assert!(parsed.controversies.is_empty());
    }

    #[test]
    fn controversy_kind_rejects_unknown() {
        let json = r#"{"summary": "x", "kind": "financial"}"#;
        let parsed: std::result::Result<Controversy, _> = serde_json::from_str(json);
        assert!(parsed.is_err());
    }

    #[test]
    fn verdict_parses_strictly() {
        let json = r#"{"valid": true, "reasons": []}"#;
        let verdict: ReviewVerdict = serde_json::from_str(json).expect("deserialize");
        assert!(verdict.valid);

        let json = r#"{"valid": false, "reasons": ["missing article title"]}"#;
        let verdict: ReviewVerdict = serde_json::from_str(json).expect("deserialize");
        assert!(!verdict.valid);
        assert_eq!(verdict.reasons.len(), 1);

        // Free text is not a verdict.
        let free_text = serde_json::from_str::<ReviewVerdict>("\"Valid\"");
        assert!(free_text.is_err());
    }

    #[test]
    fn scraper_kind_serde() {
        assert_eq!(serde_json::to_string(&ScraperKind::Reader).unwrap(), "\"reader\"");
        assert_eq!(serde_json::to_string(&ScraperKind::Html).unwrap(), "\"html\"");
        let parsed: ScraperKind = serde_json::from_str("\"html\"").unwrap();
        assert_eq!(parsed, ScraperKind::Html);
    }
}
