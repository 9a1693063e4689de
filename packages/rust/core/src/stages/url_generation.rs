//! URL generation: query → search terms → strategy → searched URLs.

use std::collections::BTreeSet;
use std::sync::Arc;

use newsgraph_shared::{LogLevel, PipelineConfig, SearchStrategy};
use newsgraph_search::SearchProvider;

use crate::fanout::run_bounded;
use crate::router::PipelineDeps;
use crate::state::PipelineState;

pub(crate) async fn run(
    deps: &PipelineDeps,
    config: &PipelineConfig,
    state: &mut PipelineState,
) {
    // Terms provided up front (e.g. via CLI flag) are reused verbatim.
    if state.search_terms.is_empty() {
        match deps.term_generator.terms_for(&state.user_query).await {
            Ok(terms) => {
                state.log.append(
                    LogLevel::Info,
                    format!("generated {} search terms from query", terms.len()),
                );
                state.search_terms = terms;
            }
            Err(e) => {
                state
                    .log
                    .append(LogLevel::Error, format!("search term generation failed: {e}"));
                return;
            }
        }
    } else {
        state.log.append(
            LogLevel::Info,
            format!("using {} provided search terms", state.search_terms.len()),
        );
    }

    // Strategy selection is a capability call; a failed classification falls
    // back to the general engine rather than killing the run.
    let strategy = match deps
        .strategy_policy
        .select(&state.user_query, &state.search_terms)
        .await
    {
        Ok(strategy) => strategy,
        Err(e) => {
            state.log.append(
                LogLevel::Warning,
                format!("strategy selection failed, falling back to general search: {e}"),
            );
            SearchStrategy::General
        }
    };

    let provider: Arc<dyn SearchProvider> = match strategy {
        SearchStrategy::General => deps.general_search.clone(),
        SearchStrategy::Contextual => deps.contextual_search.clone(),
    };

    state.log.append(
        LogLevel::Info,
        format!(
            "url generation using {strategy} strategy via {}",
            provider.name()
        ),
    );

    let search_provider = provider.clone();
    let results = run_bounded(
        config.concurrency,
        state.search_terms.clone(),
        move |term| {
            let provider = search_provider.clone();
            async move { provider.search(&term).await }
        },
    )
    .await;

    // Merge, dedup by exact URL string, cap.
    let mut urls = BTreeSet::new();
    for (term, result) in results {
        match result {
            Ok(term_urls) => {
                for url in term_urls {
                    if urls.len() >= config.url_cap {
                        break;
                    }
                    urls.insert(url);
                }
            }
            Err(e) => {
                state.log.append(
                    LogLevel::Warning,
                    format!("search failed for term '{term}': {e}"),
                );
            }
        }
    }

    state.log.append(
        LogLevel::Info,
        format!("generated {} URLs to process", urls.len()),
    );
    state.urls_to_process = urls;
}
