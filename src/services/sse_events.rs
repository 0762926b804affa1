use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        common::StationStateSnapshot,
        sse::{
            DisplayOrientationEvent, LoginPromptEvent, ServerEvent, StationStateEvent,
            StationWarningEvent, StoryNamePromptEvent, StoryTextEvent, SystemStatus,
        },
    },
    state::SharedState,
};

const EVENT_STORY_TEXT: &str = "story.text";
const EVENT_STATION_STATE: &str = "station.state";
const EVENT_DISPLAY_ORIENTATION: &str = "display.orientation";
const EVENT_LOGIN_PROMPT: &str = "prompt.login";
const EVENT_STORY_NAME_PROMPT: &str = "prompt.story_name";
const EVENT_STATION_WARNING: &str = "station.warning";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast a full story snapshot after the buffer mutated.
pub fn broadcast_story_text(state: &SharedState, event: StoryTextEvent) {
    send_display_event(state, EVENT_STORY_TEXT, &event);
    send_operator_event(state, EVENT_STORY_TEXT, &event);
}

/// Broadcast one station's state change to every connected client.
pub fn broadcast_station_state(state: &SharedState, snapshot: StationStateSnapshot) {
    let payload = StationStateEvent(snapshot);
    send_display_event(state, EVENT_STATION_STATE, &payload);
    send_operator_event(state, EVENT_STATION_STATE, &payload);
}

/// Broadcast the orientation the shared display must take for the writer.
pub fn broadcast_display_orientation(state: &SharedState, flipped: bool) {
    let payload = DisplayOrientationEvent { flipped };
    send_display_event(state, EVENT_DISPLAY_ORIENTATION, &payload);
}

/// Ask a station's presentation to resolve a login.
pub fn broadcast_login_prompt(state: &SharedState, station: &str) {
    let payload = LoginPromptEvent {
        station: station.to_string(),
    };
    send_display_event(state, EVENT_LOGIN_PROMPT, &payload);
    send_operator_event(state, EVENT_LOGIN_PROMPT, &payload);
}

/// Ask the promoted writer's presentation for a story name.
pub fn broadcast_story_name_prompt(state: &SharedState, station: &str) {
    let payload = StoryNamePromptEvent {
        station: station.to_string(),
    };
    send_display_event(state, EVENT_STORY_NAME_PROMPT, &payload);
    send_operator_event(state, EVENT_STORY_NAME_PROMPT, &payload);
}

/// Surface a non-blocking warning on the operator stream.
pub fn broadcast_station_warning(state: &SharedState, station: &str, message: &str) {
    let payload = StationWarningEvent {
        station: station.to_string(),
        message: message.to_string(),
    };
    send_operator_event(state, EVENT_STATION_WARNING, &payload);
}

/// Announce a degraded-mode flip to every connected client.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    let payload = SystemStatus { degraded };
    send_display_event(state, EVENT_SYSTEM_STATUS, &payload);
    send_operator_event(state, EVENT_SYSTEM_STATUS, &payload);
}

fn send_display_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.display_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize display SSE payload"),
    }
}

fn send_operator_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.operator_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize operator SSE payload"),
    }
}
