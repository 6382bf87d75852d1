// src/handlers/selection.rs
use std::sync::Arc;

use log::info;
use serde::Deserialize;
use serde_json::json;
use warp::reply::Json;
use warp::Rejection;

use crate::models::Selection;
use crate::services::orchestrator::Orchestrator;

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub scope: String,
}

/// Selection-change event. `"Global"` (any casing) selects the world
/// aggregate; anything else names an entity. The reply reports where the
/// refetch landed; on failure the previous data stays published.
pub async fn set_selection(
    body: SelectionRequest,
    orchestrator: Arc<Orchestrator>,
) -> Result<Json, Rejection> {
    info!("Handling selection change to {:?}", body.scope);

    orchestrator.select(Selection::from_scope(&body.scope)).await;

    let state = orchestrator.state().await;
    Ok(warp::reply::json(&json!({
        "selection": state.selection,
        "phase": state.phase,
        "notice": state.notice,
    })))
}
