// src/handlers/dashboard.rs
use std::sync::Arc;

use log::info;
use serde_json::json;
use warp::reply::Json;
use warp::Rejection;

use crate::services::orchestrator::Orchestrator;
use crate::services::stats;

/// Current selection, load phase, snapshot and its derived metrics, plus
/// any pending notice. Metrics are computed on read, never stored.
pub async fn get_dashboard(orchestrator: Arc<Orchestrator>) -> Result<Json, Rejection> {
    info!("Handling request for dashboard state");

    let state = orchestrator.state().await;
    let metrics = state.snapshot.as_ref().map(stats::derive);

    Ok(warp::reply::json(&json!({
        "selection": state.selection,
        "phase": state.phase,
        "snapshot": state.snapshot,
        "metrics": metrics,
        "notice": state.notice,
    })))
}

pub async fn dismiss_notice(orchestrator: Arc<Orchestrator>) -> Result<Json, Rejection> {
    info!("Handling request to dismiss notice");

    orchestrator.dismiss_notice().await;
    Ok(warp::reply::json(&json!({ "notice": null })))
}
