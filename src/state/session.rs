use thiserror::Error;

/// Lifecycle states of one station's participant session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nobody is logged in at the station.
    LoggedOut,
    /// The participant asked for a turn and waits in the admission queue.
    Queued,
    /// The participant holds the single writing turn.
    Writing,
    /// Logged in but not queued; the last turn (if any) has ended.
    Idle,
}

/// Events that can be applied to a participant session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The participant pressed the participate button.
    ParticipationRequested,
    /// A login resolved successfully (guest or registered).
    LoginSucceeded,
    /// A pending login prompt was dismissed.
    LoginCancelled,
    /// The coordinator granted the writing turn.
    Promoted,
    /// The participant submitted text and ended the turn.
    TextSubmitted,
    /// The participant gave up the turn without contributing.
    TurnSkipped,
    /// The participant closed the story being written.
    StoryFinished,
    /// The participant logged out of the station.
    LogoutRequested,
}

/// Error returned when an event cannot be applied from the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The state the session was in when the invalid event was received.
    pub from: SessionState,
    /// The event that cannot be applied from this state.
    pub event: SessionEvent,
}

/// Fixed physical slot a station occupies around the shared table.
///
/// Top slots face the opposite side, so their keyboards (and the shared
/// display, while they hold the turn) render upside down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenSlot {
    /// Lower left corner, not flipped.
    BottomLeft,
    /// Lower right corner, not flipped.
    BottomRight,
    /// Upper left corner, flipped.
    TopLeft,
    /// Upper right corner, flipped.
    TopRight,
}

impl ScreenSlot {
    /// Whether widgets at this slot render upside down.
    pub fn is_flipped(self) -> bool {
        matches!(self, ScreenSlot::TopLeft | ScreenSlot::TopRight)
    }
}

/// Label set for the two three-button action panels next to each keyboard.
#[derive(Debug, Clone)]
pub struct ButtonLabels {
    /// Left panel: logout, skip turn, participate.
    pub left: [String; 3],
    /// Right panel: finish story, clear text, submit text.
    pub right: [String; 3],
}

/// Label shown on the participate button while waiting for the turn.
const WAIT_LABEL: &str = "WAIT";

impl Default for ButtonLabels {
    fn default() -> Self {
        Self {
            left: ["LOGOUT".into(), "SKIP TURN".into(), "PARTICIPATE".into()],
            right: [
                "FINISH STORY".into(),
                "CLEAR TEXT".into(),
                "SUBMIT TEXT".into(),
            ],
        }
    }
}

/// One action button as the presentation layer should render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    /// Text on the button face.
    pub label: String,
    /// Whether pressing the button is currently allowed.
    pub enabled: bool,
}

/// Render state for both action panels and the virtual keyboard of a station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonPanels {
    /// Left panel buttons (logout, skip turn, participate).
    pub left: [ButtonState; 3],
    /// Right panel buttons (finish story, clear text, submit text).
    pub right: [ButtonState; 3],
    /// Whether the right panel is shown at all.
    pub right_visible: bool,
    /// Whether the station's virtual keyboard is shown.
    pub keyboard_visible: bool,
}

/// State machine for one keyboard station's participant.
///
/// The session is created once per station at startup and never destroyed;
/// identity and the trashed-character counter mutate across turns while the
/// state cycles through the admission lifecycle.
#[derive(Debug, Clone)]
pub struct ParticipantSession {
    station: String,
    slot: ScreenSlot,
    guest_name: String,
    identity: Option<String>,
    state: SessionState,
    trashed_chars: usize,
}

impl ParticipantSession {
    /// Create a logged-out session for the given station slot.
    pub fn new(station: String, slot: ScreenSlot, guest_name: String) -> Self {
        Self {
            station,
            slot,
            guest_name,
            identity: None,
            state: SessionState::LoggedOut,
            trashed_chars: 0,
        }
    }

    /// Identifier of the station this session belongs to.
    pub fn station(&self) -> &str {
        &self.station
    }

    /// Screen slot the station occupies.
    pub fn slot(&self) -> ScreenSlot {
        self.slot
    }

    /// Default identity used when logging in as a guest.
    pub fn guest_name(&self) -> &str {
        &self.guest_name
    }

    /// Identity of the logged-in user, if any.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether this session currently holds the writing turn.
    pub fn is_writing(&self) -> bool {
        self.state == SessionState::Writing
    }

    /// Characters discarded since the last persisted contribution.
    pub fn trashed_chars(&self) -> usize {
        self.trashed_chars
    }

    /// Record `count` additional discarded characters.
    pub(crate) fn add_trashed_chars(&mut self, count: usize) {
        self.trashed_chars += count;
    }

    /// Reset the discard counter after a contribution was recorded.
    pub(crate) fn reset_trashed_chars(&mut self) {
        self.trashed_chars = 0;
    }

    /// Store the identity a successful login resolved to.
    pub(crate) fn set_identity(&mut self, identity: String) {
        self.identity = Some(identity);
    }

    /// Drop the identity on logout.
    pub(crate) fn clear_identity(&mut self) {
        self.identity = None;
    }

    /// Apply an event, moving the session to the next state.
    pub(crate) fn apply(&mut self, event: SessionEvent) -> Result<SessionState, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.state = next;
        Ok(next)
    }

    /// Compute the state an event leads to if it is valid from here.
    fn compute_transition(&self, event: SessionEvent) -> Result<SessionState, InvalidTransition> {
        use SessionEvent::*;
        use SessionState::*;

        let next = match (self.state, event) {
            (LoggedOut | Idle, ParticipationRequested) => Queued,
            // A login resolving while not yet queued carries participation
            // intent, so every successful login lands in the queue; the
            // coordinator promotes the head separately.
            (LoggedOut | Idle | Queued, LoginSucceeded) => Queued,
            (Queued, LoginCancelled) => LoggedOut,
            (LoggedOut, LoginCancelled) => LoggedOut,
            (Queued, Promoted) => Writing,
            (Writing, TextSubmitted) => Idle,
            (Writing, TurnSkipped) => Idle,
            (Writing, StoryFinished) => Idle,
            (Writing | Queued | Idle, LogoutRequested) => LoggedOut,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }

    /// Derive the action panels the presentation layer should render for the
    /// current state, mirroring the original four-keyboard table behavior.
    pub fn panels(&self, labels: &ButtonLabels) -> ButtonPanels {
        let button = |label: &str, enabled: bool| ButtonState {
            label: label.to_string(),
            enabled,
        };
        let [logout, skip, participate] = &labels.left;

        match self.state {
            SessionState::LoggedOut => ButtonPanels {
                left: [
                    button(logout, false),
                    button(skip, false),
                    button(participate, true),
                ],
                right: right_panel(labels, false),
                right_visible: false,
                keyboard_visible: false,
            },
            SessionState::Queued => ButtonPanels {
                left: [
                    // Logging out is only possible once a login resolved.
                    button(logout, self.identity.is_some()),
                    button(skip, false),
                    button(WAIT_LABEL, false),
                ],
                right: right_panel(labels, false),
                right_visible: false,
                keyboard_visible: false,
            },
            SessionState::Writing => ButtonPanels {
                left: [
                    button(logout, true),
                    button(skip, true),
                    button(participate, false),
                ],
                right: right_panel(labels, true),
                right_visible: true,
                keyboard_visible: true,
            },
            SessionState::Idle => ButtonPanels {
                left: [
                    button(logout, true),
                    button(skip, false),
                    button(participate, true),
                ],
                right: right_panel(labels, false),
                right_visible: false,
                keyboard_visible: false,
            },
        }
    }
}

fn right_panel(labels: &ButtonLabels, enabled: bool) -> [ButtonState; 3] {
    let [finish, clear, submit] = &labels.right;
    [
        ButtonState {
            label: finish.clone(),
            enabled,
        },
        ButtonState {
            label: clear.clone(),
            enabled,
        },
        ButtonState {
            label: submit.clone(),
            enabled,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ParticipantSession {
        ParticipantSession::new("kb-1".into(), ScreenSlot::BottomLeft, "Guest1".into())
    }

    fn apply(session: &mut ParticipantSession, event: SessionEvent) -> SessionState {
        session.apply(event).unwrap()
    }

    #[test]
    fn initial_state_is_logged_out() {
        assert_eq!(session().state(), SessionState::LoggedOut);
    }

    #[test]
    fn full_turn_cycle() {
        let mut s = session();

        assert_eq!(
            apply(&mut s, SessionEvent::ParticipationRequested),
            SessionState::Queued
        );
        assert_eq!(
            apply(&mut s, SessionEvent::LoginSucceeded),
            SessionState::Queued
        );
        assert_eq!(apply(&mut s, SessionEvent::Promoted), SessionState::Writing);
        assert_eq!(
            apply(&mut s, SessionEvent::TextSubmitted),
            SessionState::Idle
        );
        assert_eq!(
            apply(&mut s, SessionEvent::ParticipationRequested),
            SessionState::Queued
        );
    }

    #[test]
    fn login_cancel_returns_to_logged_out() {
        let mut s = session();
        apply(&mut s, SessionEvent::ParticipationRequested);
        assert_eq!(
            apply(&mut s, SessionEvent::LoginCancelled),
            SessionState::LoggedOut
        );
    }

    #[test]
    fn logout_is_valid_from_writing_queued_and_idle() {
        for events in [
            vec![SessionEvent::ParticipationRequested],
            vec![
                SessionEvent::ParticipationRequested,
                SessionEvent::LoginSucceeded,
                SessionEvent::Promoted,
            ],
            vec![
                SessionEvent::ParticipationRequested,
                SessionEvent::LoginSucceeded,
                SessionEvent::Promoted,
                SessionEvent::TurnSkipped,
            ],
        ] {
            let mut s = session();
            for event in events {
                apply(&mut s, event);
            }
            assert_eq!(
                apply(&mut s, SessionEvent::LogoutRequested),
                SessionState::LoggedOut
            );
        }
    }

    #[test]
    fn submit_while_not_writing_is_rejected() {
        let mut s = session();
        let err = s.apply(SessionEvent::TextSubmitted).unwrap_err();
        assert_eq!(err.from, SessionState::LoggedOut);
        assert_eq!(err.event, SessionEvent::TextSubmitted);
    }

    #[test]
    fn promotion_requires_queued() {
        let mut s = session();
        assert!(s.apply(SessionEvent::Promoted).is_err());
    }

    #[test]
    fn trashed_chars_accumulate_until_reset() {
        let mut s = session();
        s.add_trashed_chars(5);
        s.add_trashed_chars(3);
        assert_eq!(s.trashed_chars(), 8);
        s.reset_trashed_chars();
        assert_eq!(s.trashed_chars(), 0);
    }

    #[test]
    fn queued_panel_disables_participate_with_wait_label() {
        let mut s = session();
        apply(&mut s, SessionEvent::ParticipationRequested);
        let panels = s.panels(&ButtonLabels::default());

        assert_eq!(panels.left[2].label, "WAIT");
        assert!(!panels.left[2].enabled);
        // Login has not resolved yet, so logging out is impossible.
        assert!(!panels.left[0].enabled);
        assert!(!panels.right_visible);
    }

    #[test]
    fn writing_panel_enables_everything_but_participate() {
        let mut s = session();
        apply(&mut s, SessionEvent::ParticipationRequested);
        s.set_identity("Guest1".into());
        apply(&mut s, SessionEvent::LoginSucceeded);
        apply(&mut s, SessionEvent::Promoted);

        let panels = s.panels(&ButtonLabels::default());
        assert!(panels.keyboard_visible);
        assert!(panels.right_visible);
        assert!(panels.right.iter().all(|b| b.enabled));
        assert!(panels.left[0].enabled);
        assert!(panels.left[1].enabled);
        assert!(!panels.left[2].enabled);
    }

    #[test]
    fn top_slots_are_flipped() {
        assert!(ScreenSlot::TopLeft.is_flipped());
        assert!(ScreenSlot::TopRight.is_flipped());
        assert!(!ScreenSlot::BottomLeft.is_flipped());
        assert!(!ScreenSlot::BottomRight.is_flipped());
    }
}
