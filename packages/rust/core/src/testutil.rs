//! Instrumented fake providers for engine tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use newsgraph_graph::GraphUploader;
use newsgraph_llm::{ArticleExtractor, ReviewerOracle, SearchStrategyPolicy, TermGenerator};
use newsgraph_scrape::{DomainPatternPolicy, ScraperProvider, ScraperRegistry};
use newsgraph_search::SearchProvider;
use newsgraph_shared::{
    ArticleMeta, ArticleRecord, NewsGraphError, PipelineConfig, Result, ReviewVerdict,
    SearchStrategy,
};

use crate::router::PipelineDeps;

/// Behavior knobs for a fake provider set.
#[derive(Default)]
pub(crate) struct DepsSpec {
    /// Terms the fake term generator yields (defaults to two terms).
    pub search_terms: Vec<String>,
    /// URLs every search term yields.
    pub search_results: Vec<String>,
    /// URLs whose scrape calls fail with an error.
    pub scrape_failures: Vec<String>,
    /// Artificial per-scrape latency, for concurrency measurements.
    pub scrape_delay_ms: u64,
    /// Reviewer rejects everything when set.
    pub reject_reviews: bool,
    /// Uploader fails every item when set.
    pub upload_fails: bool,
}

/// A provider set plus handles into its instrumentation.
pub(crate) struct Harness {
    pub deps: PipelineDeps,
    pub extraction_calls: Arc<AtomicUsize>,
    pub scrape_max_concurrent: Arc<AtomicUsize>,
    pub uploaded_keys: Arc<Mutex<HashSet<String>>>,
}

/// Reference pipeline config for tests: limit 3, cap 15.
pub(crate) fn config() -> PipelineConfig {
    PipelineConfig {
        concurrency: 3,
        url_cap: 15,
        call_timeout_secs: 5,
    }
}

/// A minimal well-formed record for `url`.
pub(crate) fn record(url: &str) -> ArticleRecord {
    ArticleRecord {
        article: ArticleMeta {
            title: format!("Article at {url}"),
            url: url.to_string(),
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

/// Build a full fake provider set from `spec`.
pub(crate) fn deps(spec: DepsSpec) -> PipelineDeps {
    harness(spec).deps
}

/// Build a fake provider set and keep handles to its instrumentation.
pub(crate) fn harness(spec: DepsSpec) -> Harness {
    let terms = if spec.search_terms.is_empty() {
        vec!["city budget".to_string(), "housing vote".to_string()]
    } else {
        spec.search_terms
    };

    let scraper = FakeScraper {
        failures: Arc::new(spec.scrape_failures.into_iter().collect()),
        delay_ms: spec.scrape_delay_ms,
        current: Arc::new(AtomicUsize::new(0)),
        max_concurrent: Arc::new(AtomicUsize::new(0)),
    };
    let scrape_max_concurrent = scraper.max_concurrent.clone();

    let extractor = FakeExtractor {
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let extraction_calls = extractor.calls.clone();

    let uploader = SetUploader {
        keys: Arc::new(Mutex::new(HashSet::new())),
        fail: spec.upload_fails,
    };
    let uploaded_keys = uploader.keys.clone();

    let deps = PipelineDeps {
        term_generator: Arc::new(FakeTermGenerator { terms }),
        strategy_policy: Arc::new(FixedStrategy),
        general_search: Arc::new(FakeSearch {
            results: spec.search_results.clone(),
        }),
        contextual_search: Arc::new(FakeSearch {
            results: spec.search_results,
        }),
        scraper_policy: Arc::new(DomainPatternPolicy::new(&[])),
        scrapers: Arc::new(ScraperRegistry::new(
            Box::new(scraper.clone()),
            Box::new(scraper),
        )),
        extractor: Arc::new(extractor),
        reviewer: Arc::new(FakeReviewer {
            reject: spec.reject_reviews,
        }),
        uploader: Arc::new(uploader),
    };

    Harness {
        deps,
        extraction_calls,
        scrape_max_concurrent,
        uploaded_keys,
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct FakeTermGenerator {
    terms: Vec<String>,
}

#[async_trait]
impl TermGenerator for FakeTermGenerator {
    async fn terms_for(&self, _query: &str) -> Result<Vec<String>> {
        Ok(self.terms.clone())
    }
}

struct FixedStrategy;

#[async_trait]
impl SearchStrategyPolicy for FixedStrategy {
    async fn select(&self, _query: &str, _terms: &[String]) -> Result<SearchStrategy> {
        Ok(SearchStrategy::General)
    }
}

struct FakeSearch {
    results: Vec<String>,
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, _term: &str) -> Result<Vec<String>> {
        Ok(self.results.clone())
    }

    fn name(&self) -> &str {
        "fake_search"
    }
}

#[derive(Clone)]
struct FakeScraper {
    failures: Arc<HashSet<String>>,
    delay_ms: u64,
    current: Arc<AtomicUsize>,
    max_concurrent: Arc<AtomicUsize>,
}

#[async_trait]
impl ScraperProvider for FakeScraper {
    async fn fetch(&self, url: &str) -> Result<Option<String>> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(now, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        self.current.fetch_sub(1, Ordering::SeqCst);

        if self.failures.contains(url) {
            return Err(NewsGraphError::Scrape(format!("fake scrape failure: {url}")));
        }
        Ok(Some(format!("article text for {url}")))
    }

    fn name(&self) -> &str {
        "fake_scraper"
    }
}

struct FakeExtractor {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ArticleExtractor for FakeExtractor {
    async fn extract(&self, url: &str, _text: &str) -> Result<Option<ArticleRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(record(url)))
    }
}

struct FakeReviewer {
    reject: bool,
}

#[async_trait]
impl ReviewerOracle for FakeReviewer {
    async fn review(&self, _record: &ArticleRecord) -> Result<ReviewVerdict> {
        if self.reject {
            Ok(ReviewVerdict::reject(vec![
                "rejected by test reviewer".to_string(),
            ]))
        } else {
            Ok(ReviewVerdict::approve())
        }
    }
}

/// Uploader with set semantics keyed by the record's natural key (its URL):
/// replays of an identical record leave the set unchanged.
struct SetUploader {
    keys: Arc<Mutex<HashSet<String>>>,
    fail: bool,
}

#[async_trait]
impl GraphUploader for SetUploader {
    async fn upload(&self, record: &ArticleRecord) -> Result<String> {
        if self.fail {
            return Err(NewsGraphError::Graph(format!(
                "{}: upload refused",
                record.article.url
            )));
        }
        self.keys
            .lock()
            .expect("uploader lock poisoned")
            .insert(record.article.url.clone());
        Ok(format!("merged {}", record.article.url))
    }
}
