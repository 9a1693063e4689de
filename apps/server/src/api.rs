//! API routes: run lifecycle, status/log polling, config view.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router as AxumRouter};
use color_eyre::eyre::Result;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use newsgraph_core::{Router, RunHandle, build_router, start_run};
use newsgraph_shared::{AppConfig, LogEntry, config_dir, load_config, validate_credentials};
use newsgraph_storage::Storage;

/// Shared server state: the wired pipeline, run history, and live handles.
pub(crate) struct AppState {
    router: Arc<Router>,
    storage: Storage,
    live: Mutex<HashMap<String, RunHandle>>,
    config_view: ConfigView,
}

/// The non-sensitive slice of configuration exposed over the API.
#[derive(Debug, Clone, Serialize)]
struct ConfigView {
    llm_model: String,
    llm_api_base: String,
    neo4j_http_url: String,
    neo4j_user: String,
    concurrency: usize,
    url_cap: usize,
    call_timeout_secs: u64,
}

impl ConfigView {
    fn from_config(config: &AppConfig) -> Self {
        Self {
            llm_model: config.llm.model.clone(),
            llm_api_base: config.llm.api_base.clone(),
            neo4j_http_url: config.neo4j.http_url.clone(),
            neo4j_user: config.neo4j.user.clone(),
            concurrency: config.defaults.concurrency,
            url_cap: config.defaults.url_cap,
            call_timeout_secs: config.defaults.call_timeout_secs,
        }
    }
}

/// Build the axum application with all routes wired.
pub(crate) async fn build_app() -> Result<AxumRouter> {
    let config = load_config()?;
    validate_credentials(&config)?;

    let router = Arc::new(build_router(&config, false)?);
    let storage = Storage::open(&config_dir()?.join("history.db")).await?;

    let state = Arc::new(AppState {
        router,
        storage,
        live: Mutex::new(HashMap::new()),
        config_view: ConfigView::from_config(&config),
    });

    Ok(AxumRouter::new()
        .route("/api/runs", post(start_run_handler).get(list_runs_handler))
        .route("/api/runs/{id}", get(run_status_handler))
        .route("/api/runs/{id}/log", get(run_log_handler))
        .route("/api/config", get(config_handler))
        .layer(CorsLayer::permissive())
        .with_state(state))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StartRunRequest {
    query: String,
    #[serde(default)]
    search_terms: Vec<String>,
}

#[derive(Debug, Serialize)]
struct StartRunResponse {
    run_id: String,
}

async fn start_run_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRunRequest>,
) -> Result<Json<StartRunResponse>, (StatusCode, String)> {
    if request.query.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "query must not be empty".into()));
    }

    let handle = start_run(
        state.router.clone(),
        request.query.clone(),
        request.search_terms,
    );
    let run_id = handle.id().to_string();

    info!(run_id, query = %request.query, "run started");

    state
        .storage
        .insert_run(&run_id, &request.query, handle.status().stage.as_str())
        .await
        .map_err(internal)?;

    state
        .live
        .lock()
        .expect("live runs lock poisoned")
        .insert(run_id.clone(), handle);

    // Persist the outcome once the run reaches a terminal stage.
    tokio::spawn(persist_when_finished(state.clone(), run_id.clone()));

    Ok(Json(StartRunResponse { run_id }))
}

#[derive(Debug, Serialize)]
struct RunStatusResponse {
    run_id: String,
    stage: String,
    terminal: bool,
    upload_done: bool,
}

async fn run_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RunStatusResponse>, (StatusCode, String)> {
    if let Some(handle) = state.live.lock().expect("live runs lock poisoned").get(&id) {
        let status = handle.status();
        return Ok(Json(RunStatusResponse {
            run_id: id,
            stage: status.stage.as_str().to_string(),
            terminal: status.terminal,
            upload_done: status.upload_done,
        }));
    }

    match state.storage.get_run(&id).await.map_err(internal)? {
        Some(run) => Ok(Json(RunStatusResponse {
            run_id: run.id,
            stage: run.stage,
            terminal: run.finished_at.is_some(),
            upload_done: run.upload_done,
        })),
        None => Err((StatusCode::NOT_FOUND, format!("no run with ID '{id}'"))),
    }
}

#[derive(Debug, Serialize)]
struct RunLogResponse {
    run_id: String,
    entries: Vec<LogEntry>,
}

async fn run_log_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RunLogResponse>, (StatusCode, String)> {
    let live_log = state
        .live
        .lock()
        .expect("live runs lock poisoned")
        .get(&id)
        .map(|handle| handle.log());

    let entries = match live_log {
        Some(entries) => entries,
        None => {
            if state.storage.get_run(&id).await.map_err(internal)?.is_none() {
                return Err((StatusCode::NOT_FOUND, format!("no run with ID '{id}'")));
            }
            state.storage.run_logs(&id).await.map_err(internal)?
        }
    };

    Ok(Json(RunLogResponse { run_id: id, entries }))
}

#[derive(Debug, Serialize)]
struct RunSummary {
    run_id: String,
    query: String,
    stage: String,
    upload_done: bool,
    created_at: String,
    finished_at: Option<String>,
}

async fn list_runs_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RunSummary>>, (StatusCode, String)> {
    let runs = state.storage.list_runs(50).await.map_err(internal)?;
    Ok(Json(
        runs.into_iter()
            .map(|run| RunSummary {
                run_id: run.id,
                query: run.query,
                stage: run.stage,
                upload_done: run.upload_done,
                created_at: run.created_at,
                finished_at: run.finished_at,
            })
            .collect(),
    ))
}

async fn config_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "config": state.config_view }))
}

fn internal(e: newsgraph_shared::NewsGraphError) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

// ---------------------------------------------------------------------------
// Run persistence
// ---------------------------------------------------------------------------

/// Poll a live run until it reaches a terminal stage, then record its
/// outcome and log in storage. The handle stays in the live map so status
/// and log reads keep working from memory.
async fn persist_when_finished(state: Arc<AppState>, run_id: String) {
    loop {
        tokio::time::sleep(Duration::from_millis(250)).await;

        let snapshot = {
            let live = state.live.lock().expect("live runs lock poisoned");
            live.get(&run_id)
                .map(|handle| (handle.status(), handle.log()))
        };

        let Some((status, log)) = snapshot else {
            warn!(run_id, "live run disappeared before persisting");
            return;
        };

        if !status.terminal {
            continue;
        }

        if let Err(e) = state
            .storage
            .finish_run(&run_id, status.stage.as_str(), status.upload_done)
            .await
        {
            warn!(run_id, error = %e, "failed to persist run outcome");
        }
        if let Err(e) = state.storage.append_logs(&run_id, &log).await {
            warn!(run_id, error = %e, "failed to persist run log");
        }

        info!(run_id, stage = %status.stage, "run persisted");
        return;
    }
}
