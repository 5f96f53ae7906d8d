use axum::{
    routing::{get, post},
    Router,
    extract::{rejection::JsonRejection, Json, State},
    response::{IntoResponse, Response},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use std::time::Instant;
use tracing::info;

use crate::api::response;
use crate::error::{AppError, Result};
use crate::search::{SearchOutcome, SearchRequest};
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/api/v1/search", post(search_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn ping() -> &'static str {
    "pong"
}

async fn search_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let start_time = Instant::now();

    let result = match body {
        Ok(Json(req)) => run_search(&state, &req).await,
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    };

    info!("Search request took {:?}", start_time.elapsed());

    match result {
        Ok(outcome) => response::success(outcome).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Runs one search under the configured deadline; expiry drops the in-flight upstream calls.
async fn run_search(state: &AppState, req: &SearchRequest) -> Result<SearchOutcome> {
    let deadline = state.config.request_timeout;

    tokio::time::timeout(deadline, state.pipeline.search(req))
        .await
        .map_err(|_| AppError::Timeout(deadline))?
}
