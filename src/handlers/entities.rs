// src/handlers/entities.rs
use std::sync::Arc;

use log::info;
use serde::Deserialize;
use serde_json::json;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::services::format::format_compact;
use crate::services::orchestrator::Orchestrator;
use crate::services::rank::{self, RankKey};
use crate::services::stats;

#[derive(Debug, Default, Deserialize)]
pub struct TopQuery {
    #[serde(default)]
    pub search: String,
    pub sort: Option<String>,
}

/// Ranked top-entities projection. Recomputed on every request from the
/// current collection; nothing is cached here.
pub async fn get_top_entities(
    query: TopQuery,
    orchestrator: Arc<Orchestrator>,
) -> Result<Json, Rejection> {
    info!(
        "Handling top entities request (search: {:?}, sort: {:?})",
        query.search, query.sort
    );

    let key = match query.sort.as_deref() {
        Some(sort) => RankKey::from_param(sort).ok_or_else(|| {
            warp::reject::custom(ApiError::bad_request(format!("unsupported sort key: {}", sort)))
        })?,
        None => RankKey::Cases,
    };

    let state = orchestrator.state().await;
    let ranked = rank::rank(&state.entities, &query.search, key);

    let rows: Vec<serde_json::Value> = ranked
        .iter()
        .map(|entity| {
            json!({
                "snapshot": entity,
                "activeCases": stats::active_cases(entity),
                "casesDisplay": format_compact(entity.cases as i64),
                "todayCasesDisplay": format_compact(entity.today_cases),
                "todayDeathsDisplay": format_compact(entity.today_deaths),
            })
        })
        .collect();

    Ok(warp::reply::json(&rows))
}
