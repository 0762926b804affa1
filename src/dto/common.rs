use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{
    coordinator::StationNotification,
    session::{ButtonPanels, ButtonState, ParticipantSession, SessionState},
};

/// Wire representation of a session's lifecycle state.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStateDto {
    /// Nobody is logged in at the station.
    LoggedOut,
    /// Waiting in the admission queue.
    Queued,
    /// Holding the writing turn.
    Writing,
    /// Logged in, not queued.
    Idle,
}

impl From<SessionState> for SessionStateDto {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::LoggedOut => Self::LoggedOut,
            SessionState::Queued => Self::Queued,
            SessionState::Writing => Self::Writing,
            SessionState::Idle => Self::Idle,
        }
    }
}

/// One action button as it should be rendered.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ButtonStateDto {
    /// Text on the button face.
    pub label: String,
    /// Whether pressing the button is currently allowed.
    pub enabled: bool,
}

impl From<ButtonState> for ButtonStateDto {
    fn from(button: ButtonState) -> Self {
        Self {
            label: button.label,
            enabled: button.enabled,
        }
    }
}

/// Render state for both action panels and the keyboard of a station.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ButtonPanelsDto {
    /// Left panel buttons (logout, skip turn, participate).
    pub left: Vec<ButtonStateDto>,
    /// Right panel buttons (finish story, clear text, submit text).
    pub right: Vec<ButtonStateDto>,
    /// Whether the right panel is shown at all.
    pub right_visible: bool,
    /// Whether the station's virtual keyboard is shown.
    pub keyboard_visible: bool,
}

impl From<ButtonPanels> for ButtonPanelsDto {
    fn from(panels: ButtonPanels) -> Self {
        Self {
            left: panels.left.into_iter().map(Into::into).collect(),
            right: panels.right.into_iter().map(Into::into).collect(),
            right_visible: panels.right_visible,
            keyboard_visible: panels.keyboard_visible,
        }
    }
}

/// Snapshot of one station as exposed to presentation clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationSummary {
    /// Station identifier.
    pub station: String,
    /// Current lifecycle state.
    pub state: SessionStateDto,
    /// Identity of the logged-in user, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    /// Whether this station's widgets render upside down.
    pub flipped: bool,
    /// Characters discarded since the last persisted contribution.
    pub trashed_chars: usize,
    /// Action panels as they should be rendered.
    pub panels: ButtonPanelsDto,
}

impl StationSummary {
    /// Build a summary from a session and its derived panels.
    pub fn from_session(session: &ParticipantSession, panels: ButtonPanels) -> Self {
        Self {
            station: session.station().to_string(),
            state: session.state().into(),
            identity: session.identity().map(str::to_string),
            flipped: session.slot().is_flipped(),
            trashed_chars: session.trashed_chars(),
            panels: panels.into(),
        }
    }
}

/// Compact station state change derived from a coordinator notification.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationStateSnapshot {
    /// Station whose state changed.
    pub station: String,
    /// New lifecycle state.
    pub state: SessionStateDto,
    /// Action panels as they should now be rendered.
    pub panels: ButtonPanelsDto,
}

impl From<StationNotification> for StationStateSnapshot {
    fn from(notification: StationNotification) -> Self {
        Self {
            station: notification.station,
            state: notification.state.into(),
            panels: notification.panels.into(),
        }
    }
}

/// Acknowledgement returned by station command endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Short confirmation of what the command did.
    pub message: String,
    /// Warnings raised while the command was honored anyway.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ActionResponse {
    /// Build an acknowledgement with its accompanying warnings.
    pub fn new(message: impl Into<String>, warnings: Vec<String>) -> Self {
        Self {
            message: message.into(),
            warnings,
        }
    }
}
