use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    dto::sse::{Handshake, OperatorHandshake, ServerEvent},
    error::ServiceError,
    state::{SharedState, SseHub},
};

/// Subscribe to the shared display SSE stream.
pub fn subscribe_display(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.display_sse().subscribe()
}

/// Subscribe to the operator-only SSE stream.
pub async fn subscribe_operator(
    state: &SharedState,
) -> Result<(broadcast::Receiver<ServerEvent>, String), ServiceError> {
    let token = claim_operator_token(state).await?;
    let receiver = state.operator_sse().subscribe();
    Ok((receiver, token))
}

/// Identifies the target SSE stream so we can perform stream-specific
/// bookkeeping when the connection is torn down.
#[derive(Clone)]
pub enum StreamKind {
    Display,
    /// Carries a clone of the shared application state so teardown logic can
    /// reset the operator token after the spawned task completes. Cloning
    /// `SharedState` is cheap because it is just bumping the inner `Arc`.
    Operator(SharedState),
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// cleaning up once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    kind: StreamKind,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive.
                            continue;
                        }
                    }
                }
            }
        }

        match kind {
            StreamKind::Display => tracing::info!("Display SSE stream disconnected"),
            StreamKind::Operator(state) => {
                // Own the necessary state inside the spawned task so we can
                // clean up even if the request context has already dropped.
                reset_operator_token(state).await;
                tracing::info!("Operator SSE stream disconnected")
            }
        }
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Reserve the operator token for a new stream, generating one when none
/// exists and failing if another connection already holds it.
async fn claim_operator_token(state: &SharedState) -> Result<String, ServiceError> {
    let mut guard = state.operator_token().lock().await;
    match &mut *guard {
        slot @ None => {
            let token = Uuid::new_v4().simple().to_string();
            slot.replace(token.clone());
            Ok(token)
        }
        Some(_) => Err(ServiceError::Unauthorized(
            "Another operator SSE stream is already active".into(),
        )),
    }
}

/// Broadcast a token refresh event to the operator stream.
pub fn broadcast_operator_handshake(hub: &SseHub, token: &str) {
    if let Ok(event) = ServerEvent::json(
        Some("operator_token".to_string()),
        &OperatorHandshake {
            token: token.to_string(),
        },
    ) {
        hub.broadcast(event);
    }
}

/// Send the initial handshake onto the display SSE stream so new clients
/// learn the degraded flag immediately.
pub fn broadcast_display_handshake(hub: &SseHub, degraded: bool) {
    if let Ok(event) = ServerEvent::json(
        Some("handshake".to_string()),
        &Handshake {
            stream: "display".to_string(),
            message: "display stream connected".to_string(),
            degraded,
        },
    ) {
        hub.broadcast(event);
    }
}

/// Clear any stored operator token so the next operator connection
/// negotiates a fresh credential.
async fn reset_operator_token(state: SharedState) {
    let mut guard = state.operator_token().lock().await;
    guard.take();
}
