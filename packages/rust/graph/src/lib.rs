//! Knowledge graph upload.
//!
//! A [`GraphUploader`] persists one reviewed [`ArticleRecord`] into the
//! graph database. The shipped implementation targets Neo4j's transactional
//! HTTP API and writes exclusively with `MERGE` on natural keys, so replaying
//! an upload never duplicates graph entities.

mod neo4j;
mod statements;

use async_trait::async_trait;

use newsgraph_shared::{ArticleRecord, Result};

pub use neo4j::{Neo4jConfig, Neo4jUploader};
pub use statements::{Statement, statements_for};

/// Upload capability: record in, human-readable outcome message out.
///
/// `Ok` carries a summary message for the run log; `Err` carries the upload
/// failure message. Implementations must be idempotent (merge semantics).
#[async_trait]
pub trait GraphUploader: Send + Sync {
    async fn upload(&self, record: &ArticleRecord) -> Result<String>;
}
