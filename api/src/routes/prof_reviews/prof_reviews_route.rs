//! POST /api/profReviews — answers a question about the professor reviews.

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection, response::Response};
use tracing::info;

use crate::{
    core::{app_state::AppState, http::text_stream::text_stream_response},
    error_handler::AppResult,
    routes::prof_reviews::prof_reviews_request::ProfReviewsRequest,
};

/// Handler: POST /api/profReviews
///
/// Streams the answer as `text/plain`. Errors before the first byte come
/// back as `{"error": ..., "code": ...}` with a matching status.
///
/// # Example
/// ```bash
/// curl -N -X POST http://127.0.0.1:3000/api/profReviews \
///   -H 'content-type: application/json' \
///   -d '{"messages":[{"role":"user","content":"How hard is Dr. Lee?"}]}'
/// ```
pub async fn prof_reviews(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProfReviewsRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;
    info!(turns = body.messages.len(), "question received");

    let fragments = state.pipeline.stream(&body.messages).await?;
    Ok(text_stream_response(fragments))
}
