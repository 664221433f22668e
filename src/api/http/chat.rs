// src/api/http/chat.rs
// POST /api/chat: relay a streamed Ollama reply to the client as SSE

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::relay::relay;
use crate::llm::{ChatRequest, streaming::decode_stream};
use crate::state::AppState;

/// Upstream failures before the first byte fail the request outright; once
/// the stream is open every outcome ends with `[DONE]`.
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let Json(request) = payload?;
    request.validate()?;

    let span = info_span!("chat_relay", request_id = %Uuid::new_v4());
    span.in_scope(|| {
        info!(
            messages = request.messages.len(),
            temperature = request.temperature(),
            max_tokens = request.max_tokens(),
            "Opening chat relay"
        )
    });

    let body = state
        .ollama
        .chat_stream(&request)
        .instrument(span.clone())
        .await
        .map_err(|err| {
            span.in_scope(|| error!(error = %err, "Ollama refused chat stream"));
            ApiError::from(err)
        })?;

    let events = relay(span, decode_stream(body))
        .map(|event| Ok::<_, Infallible>(event.into_sse_event()));

    Ok(Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(state.config.keep_alive())
            .text("keep-alive"),
    ))
}
