//! Query understanding: search-term generation and strategy selection.

use async_trait::async_trait;
use tracing::debug;

use newsgraph_shared::{NewsGraphError, Result, SearchStrategy};

use crate::client::ChatClient;
use crate::prompts;

/// Turns a user query into a list of search terms.
#[async_trait]
pub trait TermGenerator: Send + Sync {
    async fn terms_for(&self, query: &str) -> Result<Vec<String>>;
}

/// Chooses the search strategy for a run from the query and its terms.
#[async_trait]
pub trait SearchStrategyPolicy: Send + Sync {
    async fn select(&self, query: &str, terms: &[String]) -> Result<SearchStrategy>;
}

// ---------------------------------------------------------------------------
// LLM term generator
// ---------------------------------------------------------------------------

/// [`TermGenerator`] backed by a [`ChatClient`].
pub struct LlmTermGenerator {
    client: ChatClient,
}

impl LlmTermGenerator {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TermGenerator for LlmTermGenerator {
    async fn terms_for(&self, query: &str) -> Result<Vec<String>> {
        let completion = self
            .client
            .complete(prompts::TERM_GENERATION_SYSTEM_PROMPT, query)
            .await?;

        let terms: Vec<String> = completion
            .split(',')
            .map(|t| t.trim().trim_matches('"').to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if terms.is_empty() {
            return Err(NewsGraphError::Llm(format!(
                "no search terms could be generated from completion: {}",
                &completion[..completion.len().min(120)]
            )));
        }

        debug!(query, count = terms.len(), "search terms generated");
        Ok(terms)
    }
}

// ---------------------------------------------------------------------------
// Strategy policies
// ---------------------------------------------------------------------------

/// [`SearchStrategyPolicy`] that asks the LLM to classify the query.
pub struct LlmStrategyPolicy {
    client: ChatClient,
}

impl LlmStrategyPolicy {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchStrategyPolicy for LlmStrategyPolicy {
    async fn select(&self, query: &str, terms: &[String]) -> Result<SearchStrategy> {
        let completion = self
            .client
            .complete(
                prompts::STRATEGY_SELECTION_SYSTEM_PROMPT,
                &prompts::strategy_user_prompt(query, terms),
            )
            .await?;

        match completion.trim().to_lowercase().as_str() {
            "general" => Ok(SearchStrategy::General),
            "contextual" => Ok(SearchStrategy::Contextual),
            other => Err(NewsGraphError::Llm(format!(
                "strategy selection returned neither 'general' nor 'contextual': {}",
                &other[..other.len().min(60)]
            ))),
        }
    }
}

/// Deterministic [`SearchStrategyPolicy`]: a pure function of the terms.
///
/// Queries whose terms are mostly multi-word phrases read as topic-specific
/// research and go to the contextual engine; short keyword terms go general.
pub struct TermHeuristicPolicy;

#[async_trait]
impl SearchStrategyPolicy for TermHeuristicPolicy {
    async fn select(&self, _query: &str, terms: &[String]) -> Result<SearchStrategy> {
        if terms.is_empty() {
            return Ok(SearchStrategy::General);
        }

        let phrase_terms = terms
            .iter()
            .filter(|t| t.split_whitespace().count() >= 3)
            .count();

        if phrase_terms * 2 > terms.len() {
            Ok(SearchStrategy::Contextual)
        } else {
            Ok(SearchStrategy::General)
        }
    }
}
