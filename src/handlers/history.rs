// src/handlers/history.rs
use std::sync::Arc;

use log::info;
use serde::Deserialize;
use serde_json::json;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::models::HistoryRange;
use crate::services::orchestrator::Orchestrator;

#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    pub range: String,
}

/// The current normalized series and its summary for the active selection.
pub async fn get_history(orchestrator: Arc<Orchestrator>) -> Result<Json, Rejection> {
    info!("Handling request for historical series");

    let state = orchestrator.state().await;
    Ok(warp::reply::json(&json!({
        "selection": state.selection,
        "range": state.range,
        "summary": state.series_summary,
        "points": state.series,
    })))
}

/// Range-change event. Values outside the fixed window set are rejected.
pub async fn set_range(
    body: RangeRequest,
    orchestrator: Arc<Orchestrator>,
) -> Result<Json, Rejection> {
    info!("Handling range change to {:?}", body.range);

    let range = HistoryRange::from_param(&body.range).ok_or_else(|| {
        warp::reject::custom(ApiError::bad_request(format!(
            "unsupported history range: {}",
            body.range
        )))
    })?;

    orchestrator.set_range(range).await;

    let state = orchestrator.state().await;
    Ok(warp::reply::json(&json!({
        "range": state.range,
        "summary": state.series_summary,
    })))
}
