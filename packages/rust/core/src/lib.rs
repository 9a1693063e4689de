//! Pipeline state, router, and stage handlers for NewsGraph.
//!
//! This crate is the workflow engine: it owns the [`PipelineState`] record,
//! decides the next stage via the [`Router`] state machine, fans per-item
//! work out through a bounded task group, and defines how partial failures
//! at any stage affect downstream stages and termination. The capability
//! providers it drives live in the sibling crates.

pub mod fanout;
pub mod router;
pub mod runner;
pub mod state;
pub(crate) mod stages;

#[cfg(test)]
pub(crate) mod testutil;

pub use router::{PipelineDeps, Router, RunObserver, SilentObserver};
pub use runner::{RunHandle, build_router, start_run};
pub use state::{PipelineState, RunLog, RunStatus, Stage};
