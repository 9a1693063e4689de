//! Neo4j transactional HTTP API uploader.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use newsgraph_shared::{ArticleRecord, NewsGraphError, Result};

use crate::statements::statements_for;
use crate::GraphUploader;

/// Connection settings for the Neo4j HTTP endpoint.
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    /// HTTP endpoint base (e.g. `http://localhost:7474`).
    pub http_url: String,
    /// Target database name.
    pub database: String,
    /// Database user.
    pub user: String,
    /// Database password.
    pub password: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// [`GraphUploader`] writing through `POST /db/{database}/tx/commit`.
pub struct Neo4jUploader {
    client: reqwest::Client,
    config: Neo4jConfig,
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

impl Neo4jUploader {
    pub fn new(config: Neo4jConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NewsGraphError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn commit_url(&self) -> String {
        format!(
            "{}/db/{}/tx/commit",
            self.config.http_url.trim_end_matches('/'),
            self.config.database
        )
    }
}

#[async_trait]
impl GraphUploader for Neo4jUploader {
    async fn upload(&self, record: &ArticleRecord) -> Result<String> {
        let statements = statements_for(record);
        let count = statements.len();
        let body = serde_json::json!({ "statements": statements });

        let response = self
            .client
            .post(self.commit_url())
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| NewsGraphError::Graph(format!("{}: {e}", record.article.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsGraphError::Graph(format!(
                "{}: HTTP {status}",
                record.article.url
            )));
        }

        let parsed: TxResponse = response
            .json()
            .await
            .map_err(|e| NewsGraphError::Graph(format!("invalid tx response: {e}")))?;

        if let Some(first) = parsed.errors.first() {
            return Err(NewsGraphError::Graph(format!(
                "{}: {} ({})",
                record.article.url, first.message, first.code
            )));
        }

        debug!(url = %record.article.url, statements = count, "record merged into graph");
        Ok(format!(
            "merged {count} statements for {}",
            record.article.url
        ))
    }
}
