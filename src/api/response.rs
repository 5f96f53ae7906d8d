use axum::Json;
use axum::http::StatusCode;

use crate::api::models::{ErrorResponse, SearchResponse};
use crate::search::SearchOutcome;

pub fn success(outcome: SearchOutcome) -> (StatusCode, Json<SearchResponse>) {
    (
        StatusCode::OK,
        Json(SearchResponse {
            status: "success",
            username: outcome.username,
            pattern: outcome.pattern,
            matches: outcome.matches,
        }),
    )
}

pub fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            status: "error",
            code: status.as_u16(),
            message: message.into(),
        }),
    )
}
