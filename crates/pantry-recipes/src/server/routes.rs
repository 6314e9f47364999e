//! Request handlers

use super::error::ApiError;
use super::{AppState, REQUEST_ID_HEADER};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Instant;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

const MAX_REQUEST_ID_LEN: usize = 128;

/// Body of `POST /ask`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Successful answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Caller-supplied request id, or a fresh one
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_string)
}

/// `POST /ask`
pub async fn ask(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Response {
    let request_id = request_id(&headers);
    let span = info_span!("ask", request_id = %request_id);

    async move {
        let Json(request) = match payload {
            Ok(payload) => payload,
            Err(rejection) => {
                warn!(status = %rejection.status(), error = %rejection.body_text(), "Unreadable request body");
                return ApiError::rejected(rejection.status(), rejection.body_text(), &request_id)
                    .into_response();
            }
        };

        let started = Instant::now();
        info!(question_length = request.question.chars().count(), "Question received");

        match state.assistant.answer(&request.question).await {
            Ok(answer) => {
                info!(
                    duration_ms = started.elapsed().as_millis() as u64,
                    answer_length = answer.len(),
                    "Question answered"
                );
                (
                    [(REQUEST_ID_HEADER, request_id)],
                    Json(AskResponse { answer }),
                )
                    .into_response()
            }
            Err(e) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                if e.is_client_error() {
                    warn!(kind = e.kind(), error = %e, duration_ms, "Question rejected");
                } else {
                    error!(kind = e.kind(), error = %e, duration_ms, "Question failed");
                }
                ApiError::from_error(&e, &request_id).into_response()
            }
        }
    }
    .instrument(span)
    .await
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "assistant": state.assistant.name(),
        "recipes": state.recipe_count,
        "tools": &*state.tools,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
