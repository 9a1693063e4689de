//! Record review: LLM judgment and deterministic schema validation.

use async_trait::async_trait;
use tracing::debug;

use newsgraph_shared::{ArticleRecord, NewsGraphError, Result, ReviewVerdict};

use crate::client::ChatClient;
use crate::extractor::strip_code_fences;
use crate::prompts;

/// Review capability: structured record in, total verdict out.
///
/// The verdict schema is explicit — `valid` plus reasons. An implementation
/// that cannot produce a well-formed verdict must fail the call rather than
/// guess; a failed call is an item-level failure for the caller, never an
/// approval.
#[async_trait]
pub trait ReviewerOracle: Send + Sync {
    async fn review(&self, record: &ArticleRecord) -> Result<ReviewVerdict>;
}

// ---------------------------------------------------------------------------
// LLM reviewer
// ---------------------------------------------------------------------------

/// [`ReviewerOracle`] backed by a [`ChatClient`].
pub struct LlmReviewer {
    client: ChatClient,
}

impl LlmReviewer {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReviewerOracle for LlmReviewer {
    async fn review(&self, record: &ArticleRecord) -> Result<ReviewVerdict> {
        let record_json = serde_json::to_string_pretty(record)
            .map_err(|e| NewsGraphError::parse(format!("record serialization failed: {e}")))?;

        let completion = self
            .client
            .complete(
                prompts::REVIEW_SYSTEM_PROMPT,
                &prompts::review_user_prompt(&record_json),
            )
            .await?;

        let cleaned = strip_code_fences(&completion);
        let verdict: ReviewVerdict = serde_json::from_str(cleaned).map_err(|e| {
            NewsGraphError::Llm(format!(
                "reviewer returned a malformed verdict ({e}): {}",
                &cleaned[..cleaned.len().min(120)]
            ))
        })?;

        debug!(
            url = %record.article.url,
            valid = verdict.valid,
            reasons = verdict.reasons.len(),
            "review verdict received"
        );
        Ok(verdict)
    }
}

// ---------------------------------------------------------------------------
// Deterministic schema validator
// ---------------------------------------------------------------------------

/// [`ReviewerOracle`] that checks structural requirements without an LLM.
///
/// Useful for offline runs and as a cheap pre-filter; the checks mirror the
/// required-field constraints of the extraction schema.
pub struct SchemaValidator;

#[async_trait]
impl ReviewerOracle for SchemaValidator {
    async fn review(&self, record: &ArticleRecord) -> Result<ReviewVerdict> {
        let mut reasons = Vec::new();

        if record.article.title.trim().is_empty() {
            reasons.push("article title is empty".to_string());
        }
        if record.article.url.trim().is_empty() {
            reasons.push("article url is empty".to_string());
        }

        for (i, s) in record.stakeholders.iter().enumerate() {
            if s.name.trim().is_empty() {
                reasons.push(format!("stakeholder #{i} has an empty name"));
            }
            for (j, q) in s.quotes.iter().enumerate() {
                if q.text.trim().is_empty() {
                    reasons.push(format!("stakeholder #{i} quote #{j} has empty text"));
                }
            }
        }

        for (i, e) in record.events.iter().enumerate() {
            if e.title.trim().is_empty() {
                reasons.push(format!("event #{i} has an empty title"));
            }
        }

        for (i, f) in record.facts.iter().enumerate() {
            if f.fact.trim().is_empty() {
                reasons.push(format!("fact #{i} is empty"));
            }
        }

        for (i, c) in record.controversies.iter().enumerate() {
            if c.summary.trim().is_empty() {
                reasons.push(format!("controversy #{i} has an empty summary"));
            }
        }

        for (i, inst) in record.institutions.iter().enumerate() {
            if inst.name.trim().is_empty() {
                reasons.push(format!("institution #{i} has an empty name"));
            }
        }

        if reasons.is_empty() {
            Ok(ReviewVerdict::approve())
        } else {
            Ok(ReviewVerdict::reject(reasons))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsgraph_shared::{ArticleMeta, Fact, Stakeholder, StakeholderKind};

    fn minimal_record() -> ArticleRecord {
        ArticleRecord {
            article: ArticleMeta {
                title: "Vote Passes".into(),
                url: "https://a.example/1".into(),
                date_published: None,
            },
            stakeholders: vec![],
            events: vec![],
            facts: vec![],
            issues: vec![],
            documents: vec![],
            controversies: vec![],
            institutions: vec![],
        }
    }

    #[tokio::test]
    async fn schema_validator_approves_well_formed_record() {
        let mut record = minimal_record();
        record.facts.push(Fact {
            fact: "The measure passed.".into(),
            summary: None,
            description: None,
        });

        let verdict = SchemaValidator.review(&record).await.unwrap();
        assert!(verdict.valid);
        assert!(verdict.reasons.is_empty());
    }

    #[tokio::test]
    async fn schema_validator_rejects_with_reasons() {
        let mut record = minimal_record();
        record.article.title = "  ".into();
        record.stakeholders.push(Stakeholder {
            name: String::new(),
            kind: StakeholderKind::Person,
            relationships: Default::default(),
            quotes: vec![],
        });

        let verdict = SchemaValidator.review(&record).await.unwrap();
        assert!(!verdict.valid);
        assert_eq!(verdict.reasons.len(), 2);
        assert!(verdict.reasons[0].contains("title"));
    }

    #[tokio::test]
    async fn llm_reviewer_parses_verdict() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({
                    "choices": [{"message": {"role": "assistant",
                        "content": "{\"valid\": false, \"reasons\": [\"event date inconsistent\"]}"}}]
                }),
            ))
            .mount(&server)
            .await;

        let client = ChatClient::new(crate::client::ChatClientConfig {
            api_base: server.uri(),
            model: "test-model".into(),
            api_key: "sk-test".into(),
            max_tokens: 256,
            temperature: 0.0,
            timeout_secs: 5,
        })
        .unwrap();

        let verdict = LlmReviewer::new(client)
            .review(&minimal_record())
            .await
            .unwrap();
        assert!(!verdict.valid);
        assert_eq!(verdict.reasons, vec!["event date inconsistent".to_string()]);
    }

    #[tokio::test]
    async fn llm_reviewer_rejects_free_text_verdict() {
        let server = wiremock::MockServer::start().await;

        // "Valid" as prose is not a verdict; it must be an error, not a pass.
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({
                    "choices": [{"message": {"role": "assistant",
                        "content": "The data looks Valid to me."}}]
                }),
            ))
            .mount(&server)
            .await;

        let client = ChatClient::new(crate::client::ChatClientConfig {
            api_base: server.uri(),
            model: "test-model".into(),
            api_key: "sk-test".into(),
            max_tokens: 256,
            temperature: 0.0,
            timeout_secs: 5,
        })
        .unwrap();

        let result = LlmReviewer::new(client).review(&minimal_record()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("malformed verdict"));
    }
}
