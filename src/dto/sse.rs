use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::common::StationStateSnapshot;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream (`display` or `operator`).
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Handshake payload carrying the operator stream token.
pub struct OperatorHandshake {
    /// Token identifying the single allowed operator connection.
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast to the shared display whenever the story buffer mutates.
pub struct StoryTextEvent {
    /// Name of the pending or created story.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Full body text snapshot.
    pub text: String,
    /// Whether the story exists in the store already.
    pub active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever a station's lifecycle state changes.
pub struct StationStateEvent(pub StationStateSnapshot);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the shared display must flip for the current writer.
pub struct DisplayOrientationEvent {
    /// True when the display should render upside down.
    pub flipped: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Event asking a station to resolve a login before its turn can start.
pub struct LoginPromptEvent {
    /// Station the prompt targets.
    pub station: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Event asking the promoted writer to name the new story.
pub struct StoryNamePromptEvent {
    /// Station the prompt targets.
    pub station: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Operator-facing warning that did not block the triggering command.
pub struct StationWarningEvent {
    /// Station the warning originated from.
    pub station: String,
    /// Human-readable description.
    pub message: String,
}
