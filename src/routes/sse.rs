use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{
    error::AppError,
    services::sse_service::{self, StreamKind},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/display",
    responses((status = 200, description = "Shared display SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream realtime story and station events to the shared display clients.
pub async fn display_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_display(&state);
    info!("New display SSE connection");
    let degraded = state.is_degraded().await;
    sse_service::broadcast_display_handshake(state.display_sse(), degraded);
    sse_service::to_sse_stream(receiver, StreamKind::Display)
}

#[utoipa::path(
    get,
    path = "/sse/operator",
    responses((status = 200, description = "Operator SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream operator-only events, establishing or validating the operator token.
pub async fn operator_stream(
    State(state): State<SharedState>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let (receiver, token) = sse_service::subscribe_operator(&state).await?;
    info!("New operator SSE connection");
    sse_service::broadcast_operator_handshake(state.operator_sse(), &token);
    Ok(sse_service::to_sse_stream(
        receiver,
        StreamKind::Operator(state),
    ))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/display", get(display_stream))
        .route("/sse/operator", get(operator_stream))
}
