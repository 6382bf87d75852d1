// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;

use log::info;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::error::ApiError;
use crate::handlers::{
    dashboard::{dismiss_notice, get_dashboard},
    entities::{get_top_entities, TopQuery},
    history::{get_history, set_range, RangeRequest},
    selection::{set_selection, SelectionRequest},
};
use crate::services::orchestrator::Orchestrator;

// Recovery handling for our custom errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = "Invalid request body".to_string();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(
    orchestrator: Arc<Orchestrator>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || orchestrator.clone());

    let dashboard_route = warp::path!("api" / "v1" / "dashboard")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_dashboard);

    let history_route = warp::path!("api" / "v1" / "history")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_history);

    let entities_route = warp::path!("api" / "v1" / "entities" / "top")
        .and(warp::get())
        .and(warp::query::<TopQuery>())
        .and(state_filter.clone())
        .and_then(get_top_entities);

    let selection_route = warp::path!("api" / "v1" / "selection")
        .and(warp::post())
        .and(warp::body::json::<SelectionRequest>())
        .and(state_filter.clone())
        .and_then(set_selection);

    let range_route = warp::path!("api" / "v1" / "range")
        .and(warp::post())
        .and(warp::body::json::<RangeRequest>())
        .and(state_filter.clone())
        .and_then(set_range);

    let notice_route = warp::path!("api" / "v1" / "notice" / "dismiss")
        .and(warp::post())
        .and(state_filter.clone())
        .and_then(dismiss_notice);

    info!("All routes configured successfully.");

    dashboard_route
        .or(history_route)
        .or(entities_route)
        .or(selection_route)
        .or(range_route)
        .or(notice_route)
        .recover(handle_rejection)
}
