use std::collections::VecDeque;

use indexmap::IndexMap;
use thiserror::Error;

use crate::state::{
    session::{
        ButtonLabels, ButtonPanels, InvalidTransition, ParticipantSession, SessionEvent,
        SessionState,
    },
    story::{StoryBuffer, StoryId},
};

/// Commands the presentation layer can issue against the coordinator.
///
/// Every station input funnels into this enum and through a single
/// serialized [`TurnCoordinator::apply`] call, so the coordinator never has
/// to know which widget or dialog produced an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationCommand {
    /// A station asks to join the admission queue.
    Participate {
        /// Originating station.
        station: String,
    },
    /// A login resolved; `identity` of `None` means the station guest.
    Login {
        /// Originating station.
        station: String,
        /// Explicit identity, or `None` for the station's guest account.
        identity: Option<String>,
    },
    /// A pending login prompt was dismissed.
    CancelLogin {
        /// Originating station.
        station: String,
    },
    /// The writer submits text and ends the turn.
    SubmitText {
        /// Originating station.
        station: String,
        /// Text contributed during this turn; may be empty.
        text: String,
    },
    /// The writer gives up the turn without contributing.
    SkipTurn {
        /// Originating station.
        station: String,
    },
    /// The participant discarded their current draft.
    ClearText {
        /// Originating station.
        station: String,
        /// The draft text that was thrown away.
        discarded: String,
    },
    /// The writer closes the story, contributing a final piece of text.
    FinishStory {
        /// Originating station.
        station: String,
        /// Final contribution; may be empty.
        text: String,
    },
    /// The participant logs out, carrying any unsaved draft text.
    Logout {
        /// Originating station.
        station: String,
        /// Draft text still unsaved at the station; may be empty.
        text: String,
    },
    /// Supply the name for the story about to be written.
    SetStoryName {
        /// Name for the new story.
        name: String,
    },
}

/// Errors a command can be rejected with. None of these are fatal: the
/// coordinator state is untouched when they are returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// The command referenced a station that was never configured.
    #[error("unknown station `{0}`")]
    UnknownStation(String),
    /// The station already holds a place in the admission queue.
    #[error("station `{station}` is already queued for a turn")]
    DuplicateParticipant {
        /// Station that tried to enqueue twice.
        station: String,
    },
    /// A contribution was attempted before a story name was supplied.
    #[error("no story name has been set")]
    NoStoryName,
    /// The active story has been created and can no longer be renamed.
    #[error("story `{name}` has already been created and cannot be renamed")]
    StoryAlreadyCreated {
        /// Name of the story already in the store.
        name: String,
    },
    /// A writing-turn command arrived from a station without an identity.
    #[error("station `{station}` has no logged-in user")]
    NotLoggedIn {
        /// Station the command came from.
        station: String,
    },
    /// The event is not valid in the session's current state.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

/// A contribution captured during a command, to be persisted afterwards.
///
/// The draft snapshots the story identity at the moment the turn ended so
/// that a finish (which resets the buffer in the same command) still knows
/// which story the record belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionDraft {
    /// Identity the contribution is credited to.
    pub identity: String,
    /// Contributed text; may be empty when only trashed characters are recorded.
    pub text: String,
    /// Characters the participant discarded since their last contribution.
    pub trashed_chars: usize,
    /// Story id if the store has already created the story.
    pub story_id: Option<StoryId>,
    /// Story name, used to create the story on its first contribution.
    pub story_name: String,
    /// Whether this contribution closed the story.
    pub closes_story: bool,
}

/// Prompt the presentation layer must resolve before a turn can proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// The promoted station has no identity yet and must log in.
    Login {
        /// Station the prompt targets.
        station: String,
    },
    /// No story is active; the writer must name the new story.
    StoryName {
        /// Station the prompt targets.
        station: String,
    },
}

/// Non-fatal condition surfaced to operators but not blocking the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The same identity is already active at another queued station.
    /// Preserved as warn-only: the request is still honored.
    DuplicateIdentity {
        /// Station that triggered the conflict.
        station: String,
        /// Identity active in more than one place.
        identity: String,
    },
    /// Unsaved text was dropped because no story was active to attach it to.
    TextWithoutStory {
        /// Station whose draft was dropped.
        station: String,
    },
}

/// Per-station state change the presentation layer must render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationNotification {
    /// Station whose state changed.
    pub station: String,
    /// New lifecycle state.
    pub state: SessionState,
    /// Action panels as they should now be rendered.
    pub panels: ButtonPanels,
}

/// Everything a successfully applied command asks the outside world to do.
///
/// The coordinator itself is pure and synchronous; persistence calls and
/// broadcasts described here are executed by the dispatching service, and
/// their failure never rolls the in-memory state back.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Station state changes to broadcast.
    pub notifications: Vec<StationNotification>,
    /// Contribution records to persist (at most one per command today).
    pub contributions: Vec<ContributionDraft>,
    /// Prompts the presentation layer must show.
    pub prompts: Vec<Prompt>,
    /// Operator-facing warnings.
    pub warnings: Vec<Warning>,
    /// Whether the story buffer changed and a snapshot should be broadcast.
    pub story_changed: bool,
    /// Whether the active story was closed by this command.
    pub story_finished: bool,
    /// New orientation for the shared display when a writer was promoted.
    pub display_flipped: Option<bool>,
}

/// Arbiter of the single writing turn.
///
/// Owns the admission queue, the per-station sessions, and the shared story
/// buffer. All mutations go through [`TurnCoordinator::apply`]; callers are
/// expected to serialize access (the application wraps the coordinator in a
/// mutex held for the whole command, persistence included).
#[derive(Debug)]
pub struct TurnCoordinator {
    sessions: IndexMap<String, ParticipantSession>,
    queue: VecDeque<String>,
    story: StoryBuffer,
    labels: ButtonLabels,
}

impl TurnCoordinator {
    /// Build a coordinator over the configured stations.
    pub fn new(stations: Vec<ParticipantSession>, labels: ButtonLabels) -> Self {
        let sessions = stations
            .into_iter()
            .map(|session| (session.station().to_string(), session))
            .collect();
        Self {
            sessions,
            queue: VecDeque::new(),
            story: StoryBuffer::new(),
            labels,
        }
    }

    /// Apply one presentation command, returning the effects to execute.
    pub fn apply(&mut self, command: StationCommand) -> Result<Outcome, CoordinatorError> {
        match command {
            StationCommand::Participate { station } => self.request_participation(&station),
            StationCommand::Login { station, identity } => self.login(&station, identity),
            StationCommand::CancelLogin { station } => self.cancel_login(&station),
            StationCommand::SubmitText { station, text } => self.submit(&station, text),
            StationCommand::SkipTurn { station } => self.skip(&station),
            StationCommand::ClearText { station, discarded } => {
                self.clear_text(&station, &discarded)
            }
            StationCommand::FinishStory { station, text } => self.finish(&station, text),
            StationCommand::Logout { station, text } => self.logout(&station, text),
            StationCommand::SetStoryName { name } => self.set_story_name(name),
        }
    }

    /// The shared story buffer.
    pub fn story(&self) -> &StoryBuffer {
        &self.story
    }

    /// All sessions in configured station order.
    pub fn sessions(&self) -> impl Iterator<Item = &ParticipantSession> {
        self.sessions.values()
    }

    /// Session for one station.
    pub fn session(&self, station: &str) -> Option<&ParticipantSession> {
        self.sessions.get(station)
    }

    /// Stations currently queued, head (the writer) first.
    pub fn queue(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    /// Station currently holding the writing turn, if any.
    pub fn writing_station(&self) -> Option<&str> {
        self.sessions
            .values()
            .find(|session| session.is_writing())
            .map(ParticipantSession::station)
    }

    /// Button label set stations render their panels with.
    pub fn labels(&self) -> &ButtonLabels {
        &self.labels
    }

    /// Record the id the store assigned to the active story.
    pub fn mark_story_created(&mut self, id: StoryId) {
        self.story.mark_created(id);
    }

    fn request_participation(&mut self, station: &str) -> Result<Outcome, CoordinatorError> {
        if self.queue.iter().any(|queued| queued == station) {
            return Err(CoordinatorError::DuplicateParticipant {
                station: station.to_string(),
            });
        }

        let session = self.session_ref(station)?;
        let mut out = Outcome::default();

        if let Some(identity) = session.identity()
            && self.identity_queued_elsewhere(station, identity)
        {
            out.warnings.push(Warning::DuplicateIdentity {
                station: station.to_string(),
                identity: identity.to_string(),
            });
        }

        self.session_mut(station)?
            .apply(SessionEvent::ParticipationRequested)?;
        self.queue.push_back(station.to_string());
        out.notifications.extend(self.notification(station));
        self.advance(&mut out);
        Ok(out)
    }

    fn login(&mut self, station: &str, identity: Option<String>) -> Result<Outcome, CoordinatorError> {
        let session = self.session_ref(station)?;
        let resolved = identity.unwrap_or_else(|| session.guest_name().to_string());

        let mut out = Outcome::default();
        if self.identity_queued_elsewhere(station, &resolved) {
            out.warnings.push(Warning::DuplicateIdentity {
                station: station.to_string(),
                identity: resolved.clone(),
            });
        }

        let session = self.session_mut(station)?;
        session.apply(SessionEvent::LoginSucceeded)?;
        session.set_identity(resolved);

        if !self.queue.iter().any(|queued| queued == station) {
            self.queue.push_back(station.to_string());
        }
        out.notifications.extend(self.notification(station));
        self.advance(&mut out);
        Ok(out)
    }

    fn cancel_login(&mut self, station: &str) -> Result<Outcome, CoordinatorError> {
        let session = self.session_mut(station)?;
        session.apply(SessionEvent::LoginCancelled)?;
        session.clear_identity();

        let mut out = Outcome::default();
        self.remove_from_queue(station);
        out.notifications.extend(self.notification(station));
        self.advance(&mut out);
        Ok(out)
    }

    fn submit(&mut self, station: &str, text: String) -> Result<Outcome, CoordinatorError> {
        let session = self.session_ref(station)?;
        if !session.is_writing() {
            return Err(InvalidTransition {
                from: session.state(),
                event: SessionEvent::TextSubmitted,
            }
            .into());
        }
        let identity = session
            .identity()
            .map(str::to_string)
            .ok_or_else(|| CoordinatorError::NotLoggedIn {
                station: station.to_string(),
            })?;
        let trashed = session.trashed_chars();

        // An empty submission with nothing trashed records nothing at all.
        let records = !text.is_empty() || trashed > 0;
        if records && !self.story.has_name() {
            return Err(CoordinatorError::NoStoryName);
        }

        let mut out = Outcome::default();
        if !text.is_empty() {
            self.story.append_contribution(&text);
            out.story_changed = true;
        }
        if records {
            out.contributions.push(ContributionDraft {
                identity,
                text,
                trashed_chars: trashed,
                story_id: self.story.id(),
                story_name: self.story.name().unwrap_or_default().to_string(),
                closes_story: false,
            });
        }

        let session = self.session_mut(station)?;
        session.apply(SessionEvent::TextSubmitted)?;
        session.reset_trashed_chars();
        self.conclude_turn(station, &mut out);
        Ok(out)
    }

    fn skip(&mut self, station: &str) -> Result<Outcome, CoordinatorError> {
        let session = self.session_mut(station)?;
        if !session.is_writing() {
            return Err(InvalidTransition {
                from: session.state(),
                event: SessionEvent::TurnSkipped,
            }
            .into());
        }
        // Discarded draft text is never persisted; the trashed counter is
        // deliberately left alone and carries over to the next turn.
        session.apply(SessionEvent::TurnSkipped)?;

        let mut out = Outcome::default();
        self.conclude_turn(station, &mut out);
        Ok(out)
    }

    fn clear_text(&mut self, station: &str, discarded: &str) -> Result<Outcome, CoordinatorError> {
        let session = self.session_mut(station)?;
        session.add_trashed_chars(discarded.chars().count());
        Ok(Outcome::default())
    }

    fn finish(&mut self, station: &str, text: String) -> Result<Outcome, CoordinatorError> {
        let session = self.session_ref(station)?;
        if !session.is_writing() {
            return Err(InvalidTransition {
                from: session.state(),
                event: SessionEvent::StoryFinished,
            }
            .into());
        }
        let identity = session
            .identity()
            .map(str::to_string)
            .ok_or_else(|| CoordinatorError::NotLoggedIn {
                station: station.to_string(),
            })?;
        let Some(story_name) = self.story.name().map(str::to_string) else {
            return Err(CoordinatorError::NoStoryName);
        };
        let trashed = session.trashed_chars();

        let mut out = Outcome::default();
        // The final contribution is persisted against the story snapshot
        // taken here; the buffer itself resets immediately.
        out.contributions.push(ContributionDraft {
            identity,
            text,
            trashed_chars: trashed,
            story_id: self.story.id(),
            story_name,
            closes_story: true,
        });
        self.story.reset();
        out.story_changed = true;
        out.story_finished = true;

        let session = self.session_mut(station)?;
        session.apply(SessionEvent::StoryFinished)?;
        session.reset_trashed_chars();
        self.conclude_turn(station, &mut out);
        Ok(out)
    }

    fn logout(&mut self, station: &str, text: String) -> Result<Outcome, CoordinatorError> {
        let session = self.session_ref(station)?;
        let was_writing = session.is_writing();
        let identity = session.identity().map(str::to_string);
        let trashed = session.trashed_chars();

        let story_name = self.story.name().map(str::to_string);

        let mut out = Outcome::default();
        if was_writing && (!text.is_empty() || trashed > 0) {
            match (identity, story_name) {
                (Some(identity), Some(story_name)) => {
                    if !text.is_empty() {
                        self.story.append_contribution(&text);
                        out.story_changed = true;
                    }
                    out.contributions.push(ContributionDraft {
                        identity,
                        text,
                        trashed_chars: trashed,
                        story_id: self.story.id(),
                        story_name,
                        closes_story: false,
                    });
                }
                _ => {
                    out.warnings.push(Warning::TextWithoutStory {
                        station: station.to_string(),
                    });
                }
            }
        }

        let session = self.session_mut(station)?;
        session.apply(SessionEvent::LogoutRequested)?;
        session.clear_identity();
        session.reset_trashed_chars();

        self.remove_from_queue(station);
        out.notifications.extend(self.notification(station));
        self.advance(&mut out);
        Ok(out)
    }

    fn set_story_name(&mut self, name: String) -> Result<Outcome, CoordinatorError> {
        if self.story.is_story_active() {
            return Err(CoordinatorError::StoryAlreadyCreated {
                name: self.story.name().unwrap_or_default().to_string(),
            });
        }
        self.story.set_name(name);

        Ok(Outcome {
            story_changed: true,
            ..Outcome::default()
        })
    }

    /// Dequeue a station whose turn ended, then promote the next in line.
    fn conclude_turn(&mut self, station: &str, out: &mut Outcome) {
        self.remove_from_queue(station);
        out.notifications.extend(self.notification(station));
        self.advance(out);
    }

    /// Promote the queue head to the writing turn if it is ready.
    ///
    /// A head without a resolved identity stays queued and gets a login
    /// prompt instead; promotion follows once the login succeeds.
    fn advance(&mut self, out: &mut Outcome) {
        let Some(head) = self.queue.front().cloned() else {
            return;
        };
        let Some(session) = self.sessions.get_mut(&head) else {
            return;
        };
        if session.state() != SessionState::Queued {
            return;
        }

        if session.identity().is_none() {
            out.prompts.push(Prompt::Login { station: head });
            return;
        }

        if session.apply(SessionEvent::Promoted).is_ok() {
            out.display_flipped = Some(session.slot().is_flipped());
            out.notifications.push(StationNotification {
                station: head.clone(),
                state: session.state(),
                panels: session.panels(&self.labels),
            });
            if !self.story.has_name() {
                out.prompts.push(Prompt::StoryName { station: head });
            }
        }
    }

    fn remove_from_queue(&mut self, station: &str) {
        self.queue.retain(|queued| queued != station);
    }

    fn identity_queued_elsewhere(&self, station: &str, identity: &str) -> bool {
        self.queue.iter().any(|queued| {
            queued != station
                && self
                    .sessions
                    .get(queued)
                    .and_then(ParticipantSession::identity)
                    == Some(identity)
        })
    }

    fn notification(&self, station: &str) -> Option<StationNotification> {
        let session = self.sessions.get(station)?;
        Some(StationNotification {
            station: station.to_string(),
            state: session.state(),
            panels: session.panels(&self.labels),
        })
    }

    fn session_ref(&self, station: &str) -> Result<&ParticipantSession, CoordinatorError> {
        self.sessions
            .get(station)
            .ok_or_else(|| CoordinatorError::UnknownStation(station.to_string()))
    }

    fn session_mut(&mut self, station: &str) -> Result<&mut ParticipantSession, CoordinatorError> {
        self.sessions
            .get_mut(station)
            .ok_or_else(|| CoordinatorError::UnknownStation(station.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::session::ScreenSlot;
    use uuid::Uuid;

    fn coordinator() -> TurnCoordinator {
        let stations = vec![
            ParticipantSession::new("kb-1".into(), ScreenSlot::BottomLeft, "Guest1".into()),
            ParticipantSession::new("kb-2".into(), ScreenSlot::TopLeft, "Guest2".into()),
            ParticipantSession::new("kb-3".into(), ScreenSlot::TopRight, "Guest3".into()),
            ParticipantSession::new("kb-4".into(), ScreenSlot::BottomRight, "Guest4".into()),
        ];
        TurnCoordinator::new(stations, ButtonLabels::default())
    }

    fn apply(c: &mut TurnCoordinator, command: StationCommand) -> Outcome {
        c.apply(command).unwrap()
    }

    /// Participate as guest and resolve the login prompt, leaving the
    /// station wherever the queue puts it.
    fn join(c: &mut TurnCoordinator, station: &str) {
        apply(
            c,
            StationCommand::Participate {
                station: station.into(),
            },
        );
        apply(
            c,
            StationCommand::Login {
                station: station.into(),
                identity: None,
            },
        );
    }

    fn name_story(c: &mut TurnCoordinator, name: &str) {
        apply(c, StationCommand::SetStoryName { name: name.into() });
    }

    fn state_of(c: &TurnCoordinator, station: &str) -> SessionState {
        c.session(station).unwrap().state()
    }

    fn writing_count(c: &TurnCoordinator) -> usize {
        c.sessions().filter(|s| s.is_writing()).count()
    }

    #[test]
    fn first_participant_is_promoted_immediately() {
        let mut c = coordinator();
        let out = apply(
            &mut c,
            StationCommand::Participate {
                station: "kb-1".into(),
            },
        );

        // Nobody is logged in at the station yet, so promotion waits on the
        // login prompt.
        assert_eq!(state_of(&c, "kb-1"), SessionState::Queued);
        assert_eq!(
            out.prompts,
            vec![Prompt::Login {
                station: "kb-1".into()
            }]
        );

        let out = apply(
            &mut c,
            StationCommand::Login {
                station: "kb-1".into(),
                identity: None,
            },
        );
        assert_eq!(state_of(&c, "kb-1"), SessionState::Writing);
        assert_eq!(c.session("kb-1").unwrap().identity(), Some("Guest1"));
        assert!(out
            .prompts
            .contains(&Prompt::StoryName {
                station: "kb-1".into()
            }));
        assert_eq!(c.queue().collect::<Vec<_>>(), vec!["kb-1"]);
    }

    #[test]
    fn submit_flushes_buffer_and_vacates_queue() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        name_story(&mut c, "Campfire");

        let out = apply(
            &mut c,
            StationCommand::SubmitText {
                station: "kb-1".into(),
                text: "hello".into(),
            },
        );

        assert_eq!(c.story().current_text(), "hello");
        assert!(out.story_changed);
        assert_eq!(out.contributions.len(), 1);
        assert_eq!(out.contributions[0].text, "hello");
        assert_eq!(out.contributions[0].identity, "Guest1");
        assert_eq!(state_of(&c, "kb-1"), SessionState::Idle);
        assert_eq!(c.queue().count(), 0);
    }

    #[test]
    fn fifo_order_is_strict() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        name_story(&mut c, "Relay");
        join(&mut c, "kb-2");
        join(&mut c, "kb-3");

        let mut order = vec![c.writing_station().unwrap().to_string()];
        for _ in 0..2 {
            let writer = c.writing_station().unwrap().to_string();
            apply(
                &mut c,
                StationCommand::SubmitText {
                    station: writer,
                    text: "x".into(),
                },
            );
            order.push(c.writing_station().unwrap().to_string());
        }

        assert_eq!(order, vec!["kb-1", "kb-2", "kb-3"]);
    }

    #[test]
    fn single_writer_invariant_holds_throughout() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        name_story(&mut c, "Invariants");
        join(&mut c, "kb-2");
        join(&mut c, "kb-3");
        assert_eq!(writing_count(&c), 1);

        apply(
            &mut c,
            StationCommand::SkipTurn {
                station: "kb-1".into(),
            },
        );
        assert_eq!(writing_count(&c), 1);

        apply(
            &mut c,
            StationCommand::Logout {
                station: "kb-2".into(),
                text: String::new(),
            },
        );
        assert_eq!(writing_count(&c), 1);
        assert_eq!(state_of(&c, "kb-3"), SessionState::Writing);
    }

    #[test]
    fn queue_membership_matches_session_state() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        name_story(&mut c, "Membership");
        join(&mut c, "kb-2");

        for session in c.sessions() {
            let queued = c.queue().any(|station| station == session.station());
            let should_be_queued = matches!(
                session.state(),
                SessionState::Queued | SessionState::Writing
            );
            assert_eq!(queued, should_be_queued, "station {}", session.station());
        }
    }

    #[test]
    fn duplicate_participation_is_rejected() {
        let mut c = coordinator();
        join(&mut c, "kb-1");

        let err = c
            .apply(StationCommand::Participate {
                station: "kb-1".into(),
            })
            .unwrap_err();
        assert_eq!(
            err,
            CoordinatorError::DuplicateParticipant {
                station: "kb-1".into()
            }
        );
    }

    #[test]
    fn duplicate_identity_warns_but_still_enqueues() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        apply(
            &mut c,
            StationCommand::Participate {
                station: "kb-2".into(),
            },
        );
        let out = apply(
            &mut c,
            StationCommand::Login {
                station: "kb-2".into(),
                identity: Some("Guest1".into()),
            },
        );

        assert_eq!(
            out.warnings,
            vec![Warning::DuplicateIdentity {
                station: "kb-2".into(),
                identity: "Guest1".into()
            }]
        );
        assert!(c.queue().any(|station| station == "kb-2"));
    }

    #[test]
    fn clear_text_accumulates_and_submit_resets() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        name_story(&mut c, "Accounting");

        apply(
            &mut c,
            StationCommand::ClearText {
                station: "kb-1".into(),
                discarded: "abcde".into(),
            },
        );
        apply(
            &mut c,
            StationCommand::ClearText {
                station: "kb-1".into(),
                discarded: "xy".into(),
            },
        );
        assert_eq!(c.session("kb-1").unwrap().trashed_chars(), 7);

        let out = apply(
            &mut c,
            StationCommand::SubmitText {
                station: "kb-1".into(),
                text: "kept".into(),
            },
        );
        assert_eq!(out.contributions[0].trashed_chars, 7);
        assert_eq!(c.session("kb-1").unwrap().trashed_chars(), 0);
    }

    #[test]
    fn empty_submit_with_no_trash_records_nothing() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        name_story(&mut c, "Silence");

        let out = apply(
            &mut c,
            StationCommand::SubmitText {
                station: "kb-1".into(),
                text: String::new(),
            },
        );

        assert!(out.contributions.is_empty());
        assert!(!out.story_changed);
        assert_eq!(c.story().current_text(), "");
        // The turn still ends.
        assert_eq!(state_of(&c, "kb-1"), SessionState::Idle);
    }

    #[test]
    fn empty_submit_with_trash_still_records_a_contribution() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        name_story(&mut c, "Trash only");
        apply(
            &mut c,
            StationCommand::ClearText {
                station: "kb-1".into(),
                discarded: "typo".into(),
            },
        );

        let out = apply(
            &mut c,
            StationCommand::SubmitText {
                station: "kb-1".into(),
                text: String::new(),
            },
        );

        assert_eq!(out.contributions.len(), 1);
        assert_eq!(out.contributions[0].trashed_chars, 4);
        assert!(out.contributions[0].text.is_empty());
        assert_eq!(c.story().current_text(), "");
    }

    #[test]
    fn skip_preserves_trashed_chars() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        name_story(&mut c, "Skips");
        apply(
            &mut c,
            StationCommand::ClearText {
                station: "kb-1".into(),
                discarded: "abc".into(),
            },
        );

        let out = apply(
            &mut c,
            StationCommand::SkipTurn {
                station: "kb-1".into(),
            },
        );

        assert!(out.contributions.is_empty());
        assert_eq!(c.session("kb-1").unwrap().trashed_chars(), 3);
        assert_eq!(state_of(&c, "kb-1"), SessionState::Idle);
    }

    #[test]
    fn finish_resets_story_and_promotes_next() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        name_story(&mut c, "Chained");
        apply(
            &mut c,
            StationCommand::SubmitText {
                station: "kb-1".into(),
                text: "start".into(),
            },
        );
        c.mark_story_created(Uuid::new_v4());
        join(&mut c, "kb-1");
        join(&mut c, "kb-2");

        let out = apply(
            &mut c,
            StationCommand::FinishStory {
                station: "kb-1".into(),
                text: "world".into(),
            },
        );

        assert!(out.story_finished);
        assert_eq!(out.contributions.len(), 1);
        assert!(out.contributions[0].closes_story);
        assert_eq!(out.contributions[0].story_name, "Chained");
        assert!(out.contributions[0].story_id.is_some());
        assert_eq!(c.story().current_text(), "");
        assert!(!c.story().has_name());
        assert_eq!(state_of(&c, "kb-2"), SessionState::Writing);
        assert_eq!(c.queue().collect::<Vec<_>>(), vec!["kb-2"]);
    }

    #[test]
    fn logout_persists_unsaved_text_before_clearing_identity() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        name_story(&mut c, "Farewell");

        let out = apply(
            &mut c,
            StationCommand::Logout {
                station: "kb-1".into(),
                text: "abc".into(),
            },
        );

        assert_eq!(out.contributions.len(), 1);
        assert_eq!(out.contributions[0].text, "abc");
        assert_eq!(out.contributions[0].identity, "Guest1");
        assert_eq!(c.story().current_text(), "abc");
        assert_eq!(state_of(&c, "kb-1"), SessionState::LoggedOut);
        assert!(c.session("kb-1").unwrap().identity().is_none());
        assert_eq!(c.queue().count(), 0);
    }

    #[test]
    fn logout_from_queue_advances_the_turn() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        name_story(&mut c, "Departure");
        join(&mut c, "kb-2");
        join(&mut c, "kb-3");

        apply(
            &mut c,
            StationCommand::Logout {
                station: "kb-1".into(),
                text: String::new(),
            },
        );

        assert_eq!(state_of(&c, "kb-2"), SessionState::Writing);
        assert_eq!(c.queue().collect::<Vec<_>>(), vec!["kb-2", "kb-3"]);
    }

    #[test]
    fn cancelled_login_leaves_the_queue() {
        let mut c = coordinator();
        apply(
            &mut c,
            StationCommand::Participate {
                station: "kb-1".into(),
            },
        );
        apply(
            &mut c,
            StationCommand::Participate {
                station: "kb-2".into(),
            },
        );

        let out = apply(
            &mut c,
            StationCommand::CancelLogin {
                station: "kb-1".into(),
            },
        );

        assert_eq!(state_of(&c, "kb-1"), SessionState::LoggedOut);
        // kb-2 becomes the head and is prompted to log in.
        assert_eq!(
            out.prompts,
            vec![Prompt::Login {
                station: "kb-2".into()
            }]
        );
        assert_eq!(c.queue().collect::<Vec<_>>(), vec!["kb-2"]);
    }

    #[test]
    fn re_entry_goes_to_the_back_of_the_queue() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        name_story(&mut c, "Rounds");
        join(&mut c, "kb-2");

        apply(
            &mut c,
            StationCommand::SubmitText {
                station: "kb-1".into(),
                text: "first".into(),
            },
        );
        join(&mut c, "kb-1");

        assert_eq!(c.queue().collect::<Vec<_>>(), vec!["kb-2", "kb-1"]);
        assert_eq!(state_of(&c, "kb-2"), SessionState::Writing);
        assert_eq!(state_of(&c, "kb-1"), SessionState::Queued);
    }

    #[test]
    fn submit_without_story_name_is_rejected() {
        let mut c = coordinator();
        join(&mut c, "kb-1");

        let err = c
            .apply(StationCommand::SubmitText {
                station: "kb-1".into(),
                text: "orphan".into(),
            })
            .unwrap_err();
        assert_eq!(err, CoordinatorError::NoStoryName);
        // The rejected command must not have ended the turn.
        assert_eq!(state_of(&c, "kb-1"), SessionState::Writing);
    }

    #[test]
    fn created_story_cannot_be_renamed() {
        let mut c = coordinator();
        join(&mut c, "kb-1");
        name_story(&mut c, "Original");
        c.mark_story_created(Uuid::new_v4());

        let err = c
            .apply(StationCommand::SetStoryName {
                name: "Renamed".into(),
            })
            .unwrap_err();
        assert_eq!(
            err,
            CoordinatorError::StoryAlreadyCreated {
                name: "Original".into()
            }
        );
    }

    #[test]
    fn promotion_flips_display_for_top_slots() {
        let mut c = coordinator();
        join(&mut c, "kb-2");
        let session = c.session("kb-2").unwrap();
        assert!(session.slot().is_flipped());

        name_story(&mut c, "Upside down");
        join(&mut c, "kb-1");
        let out = apply(
            &mut c,
            StationCommand::SubmitText {
                station: "kb-2".into(),
                text: "top".into(),
            },
        );

        // kb-1 sits at the bottom, so the display turns back upright.
        assert_eq!(out.display_flipped, Some(false));
    }

    #[test]
    fn commands_for_unknown_stations_are_rejected() {
        let mut c = coordinator();
        let err = c
            .apply(StationCommand::Participate {
                station: "kb-9".into(),
            })
            .unwrap_err();
        assert_eq!(err, CoordinatorError::UnknownStation("kb-9".into()));
    }
}
