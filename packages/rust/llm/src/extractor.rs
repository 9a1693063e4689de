//! Structured article extraction via the chat API.

use async_trait::async_trait;
use tracing::{debug, warn};

use newsgraph_shared::{ArticleRecord, Result};

use crate::client::ChatClient;
use crate::prompts;

/// Character budget for article text sent to the extraction prompt.
const MAX_ARTICLE_CHARS: usize = 12_000;

/// Extraction capability: article text in, structured record or absent out.
///
/// `Ok(None)` means the model answered but the completion did not parse into
/// a record; `Err` is a provider failure. Both are item-level for callers.
#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    async fn extract(&self, url: &str, text: &str) -> Result<Option<ArticleRecord>>;
}

/// [`ArticleExtractor`] backed by a [`ChatClient`].
pub struct LlmExtractor {
    client: ChatClient,
}

impl LlmExtractor {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArticleExtractor for LlmExtractor {
    async fn extract(&self, url: &str, text: &str) -> Result<Option<ArticleRecord>> {
        let user = prompts::extraction_user_prompt(url, &truncate_content(text, MAX_ARTICLE_CHARS));
        let completion = self
            .client
            .complete(prompts::EXTRACTION_SYSTEM_PROMPT, &user)
            .await?;

        let cleaned = strip_code_fences(&completion);
        match serde_json::from_str::<ArticleRecord>(cleaned) {
            Ok(record) => {
                debug!(
                    url,
                    stakeholders = record.stakeholders.len(),
                    facts = record.facts.len(),
                    "extraction parsed"
                );
                Ok(Some(record))
            }
            Err(e) => {
                warn!(url, error = %e, "extraction completion did not parse, dropping item");
                Ok(None)
            }
        }
    }
}

/// Strip a surrounding markdown code fence (```json ... ```), if present.
pub(crate) fn strip_code_fences(completion: &str) -> &str {
    let trimmed = completion.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Truncate content to approximately `max_chars` characters.
pub(crate) fn truncate_content(content: &str, max_chars: usize) -> String {
    if content.len() <= max_chars {
        content.to_string()
    } else {
        let mut end = max_chars;
        while !content.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}\n\n[... content truncated ...]", &content[..end])
    }
}
