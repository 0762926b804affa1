//! Serialized dispatch of station commands into the turn coordinator.
//!
//! Every mutating command from the presentation layer passes through
//! [`dispatch`], which holds the coordinator lock for the whole command:
//! in-memory transition, persistence calls, and the snapshot taken for
//! broadcasting. Persistence failures are logged and never roll the turn
//! back, so the table keeps working while storage is down.

use tracing::{error, warn};

use crate::{
    dao::models::ContributionRecord,
    dto::{
        sse::StoryTextEvent,
        station::LoginRequest,
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        coordinator::{Outcome, Prompt, StationCommand, TurnCoordinator, Warning},
    },
};

/// Apply one command and execute its effects, returning operator warnings.
pub async fn dispatch(
    state: &SharedState,
    command: StationCommand,
) -> Result<Vec<String>, ServiceError> {
    let mut coordinator = state.lock_coordinator().await;
    let outcome = coordinator.apply(command)?;

    persist_contributions(state, &mut coordinator, &outcome).await;

    // Snapshot while still holding the lock so the broadcast cannot
    // interleave with a later command's mutation.
    let story_snapshot = outcome.story_changed.then(|| StoryTextEvent {
        name: coordinator.story().name().map(str::to_string),
        text: coordinator.story().current_text().to_string(),
        active: coordinator.story().is_story_active(),
    });
    drop(coordinator);

    let warnings = warning_messages(&outcome);
    broadcast_outcome(state, outcome, story_snapshot);
    Ok(warnings)
}

/// Resolve a login request and feed the resulting identity to the coordinator.
///
/// Guest logins pass straight through; registered identities are checked
/// against the store first, so they are unavailable in degraded mode.
pub async fn login(
    state: &SharedState,
    station: String,
    request: LoginRequest,
) -> Result<Vec<String>, ServiceError> {
    let identity = match request.identity {
        Some(identity) => {
            let store = state.story_store().await.ok_or(ServiceError::Degraded)?;
            let credential = request.credential.unwrap_or_default();
            let valid = store.authenticate(identity.clone(), credential).await?;
            if !valid {
                return Err(ServiceError::Unauthorized(format!(
                    "invalid credentials for `{identity}`"
                )));
            }
            Some(identity)
        }
        None => None,
    };

    dispatch(state, StationCommand::Login { station, identity }).await
}

/// Persist the contributions an outcome recorded, creating the story on its
/// first contribution. Runs inside the dispatch lock; failures are logged
/// and the affected record is dropped.
async fn persist_contributions(
    state: &SharedState,
    coordinator: &mut TurnCoordinator,
    outcome: &Outcome,
) {
    if outcome.contributions.is_empty() {
        return;
    }

    let Some(store) = state.story_store().await else {
        warn!(
            count = outcome.contributions.len(),
            "no storage backend installed; contribution(s) lost"
        );
        return;
    };

    for draft in &outcome.contributions {
        let story_id = match draft.story_id {
            Some(id) => id,
            None => match store.create_story(draft.story_name.clone()).await {
                Ok(id) => {
                    // Remember the id for later contributions, unless this
                    // very contribution also closed the story.
                    if !draft.closes_story {
                        coordinator.mark_story_created(id);
                    }
                    id
                }
                Err(err) => {
                    error!(
                        story = %draft.story_name,
                        identity = %draft.identity,
                        error = %err,
                        "failed to create story; contribution lost"
                    );
                    continue;
                }
            },
        };

        let record = ContributionRecord {
            identity: draft.identity.clone(),
            story_id,
            text: draft.text.clone(),
            trashed_chars: draft.trashed_chars as u64,
        };
        if let Err(err) = store.save_contribution(record).await {
            error!(
                identity = %draft.identity,
                story_id = %story_id,
                error = %err,
                "failed to persist contribution; turn continues"
            );
        }
    }
}

fn broadcast_outcome(state: &SharedState, outcome: Outcome, story: Option<StoryTextEvent>) {
    for notification in outcome.notifications {
        sse_events::broadcast_station_state(state, notification.into());
    }
    if let Some(flipped) = outcome.display_flipped {
        sse_events::broadcast_display_orientation(state, flipped);
    }
    for prompt in &outcome.prompts {
        match prompt {
            Prompt::Login { station } => sse_events::broadcast_login_prompt(state, station),
            Prompt::StoryName { station } => {
                sse_events::broadcast_story_name_prompt(state, station)
            }
        }
    }
    for warning in &outcome.warnings {
        let (station, message) = describe_warning(warning);
        warn!(station = %station, "{message}");
        sse_events::broadcast_station_warning(state, station, &message);
    }
    if let Some(event) = story {
        sse_events::broadcast_story_text(state, event);
    }
}

fn warning_messages(outcome: &Outcome) -> Vec<String> {
    outcome
        .warnings
        .iter()
        .map(|warning| describe_warning(warning).1)
        .collect()
}

fn describe_warning(warning: &Warning) -> (&str, String) {
    match warning {
        Warning::DuplicateIdentity { station, identity } => (
            station.as_str(),
            format!("user `{identity}` is already logged in"),
        ),
        Warning::TextWithoutStory { station } => (
            station.as_str(),
            "unsaved text dropped; no story was active".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures::future::BoxFuture;
    use uuid::Uuid;

    use super::*;
    use crate::{
        dao::{
            models::{ContributionRecord, StoryEntity, StoryListItemEntity},
            storage::{StorageError, StorageResult},
            story_store::StoryStore,
        },
        state::{
            AppState, SharedState,
            coordinator::TurnCoordinator,
            session::{ButtonLabels, ParticipantSession, ScreenSlot, SessionState},
        },
    };

    /// In-memory store double recording every call it receives.
    #[derive(Default)]
    struct MemoryStoryStore {
        created: Mutex<Vec<String>>,
        contributions: Mutex<Vec<ContributionRecord>>,
        failing: bool,
    }

    impl MemoryStoryStore {
        fn failing() -> Self {
            Self {
                failing: true,
                ..Self::default()
            }
        }

        fn failure() -> StorageError {
            StorageError::unavailable(
                "test store down".into(),
                std::io::Error::new(std::io::ErrorKind::Other, "down"),
            )
        }
    }

    impl StoryStore for MemoryStoryStore {
        fn authenticate(
            &self,
            _identity: String,
            credential: String,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            let ok = !self.failing;
            Box::pin(async move {
                if !ok {
                    return Err(MemoryStoryStore::failure());
                }
                Ok(credential == "secret")
            })
        }

        fn create_story(&self, name: String) -> BoxFuture<'static, StorageResult<Uuid>> {
            if self.failing {
                return Box::pin(async { Err(MemoryStoryStore::failure()) });
            }
            self.created.lock().unwrap().push(name);
            Box::pin(async { Ok(Uuid::new_v4()) })
        }

        fn save_contribution(
            &self,
            record: ContributionRecord,
        ) -> BoxFuture<'static, StorageResult<()>> {
            if self.failing {
                return Box::pin(async { Err(MemoryStoryStore::failure()) });
            }
            self.contributions.lock().unwrap().push(record);
            Box::pin(async { Ok(()) })
        }

        fn find_story(
            &self,
            _id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Option<StoryEntity>>> {
            Box::pin(async { Ok(None) })
        }

        fn list_stories(&self) -> BoxFuture<'static, StorageResult<Vec<StoryListItemEntity>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn two_station_state() -> SharedState {
        let stations = vec![
            ParticipantSession::new("kb-1".into(), ScreenSlot::BottomLeft, "Guest1".into()),
            ParticipantSession::new("kb-2".into(), ScreenSlot::TopLeft, "Guest2".into()),
        ];
        AppState::new(TurnCoordinator::new(stations, ButtonLabels::default()))
    }

    async fn join_and_name(state: &SharedState, station: &str, story: &str) {
        dispatch(
            state,
            StationCommand::Participate {
                station: station.into(),
            },
        )
        .await
        .unwrap();
        dispatch(
            state,
            StationCommand::Login {
                station: station.into(),
                identity: None,
            },
        )
        .await
        .unwrap();
        dispatch(state, StationCommand::SetStoryName { name: story.into() })
            .await
            .unwrap();
    }

    async fn session_state(state: &SharedState, station: &str) -> SessionState {
        let coordinator = state.lock_coordinator().await;
        coordinator.session(station).unwrap().state()
    }

    #[tokio::test]
    async fn submit_creates_story_once_and_persists_contributions() {
        let state = two_station_state();
        let store = Arc::new(MemoryStoryStore::default());
        state.set_story_store(store.clone()).await;

        join_and_name(&state, "kb-1", "Campfire").await;
        dispatch(
            &state,
            StationCommand::SubmitText {
                station: "kb-1".into(),
                text: "hello".into(),
            },
        )
        .await
        .unwrap();

        // Second turn of the same story must reuse the created id.
        dispatch(
            &state,
            StationCommand::Participate {
                station: "kb-1".into(),
            },
        )
        .await
        .unwrap();
        dispatch(
            &state,
            StationCommand::SubmitText {
                station: "kb-1".into(),
                text: "again".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(store.created.lock().unwrap().as_slice(), ["Campfire"]);
        let contributions = store.contributions.lock().unwrap();
        assert_eq!(contributions.len(), 2);
        assert_eq!(contributions[0].text, "hello");
        assert_eq!(contributions[1].text, "again");
        assert_eq!(contributions[0].story_id, contributions[1].story_id);
    }

    #[tokio::test]
    async fn persistence_failure_never_blocks_the_turn() {
        let state = two_station_state();
        state
            .set_story_store(Arc::new(MemoryStoryStore::failing()))
            .await;

        join_and_name(&state, "kb-1", "Fragile").await;
        dispatch(
            &state,
            StationCommand::Participate {
                station: "kb-2".into(),
            },
        )
        .await
        .unwrap();
        dispatch(
            &state,
            StationCommand::Login {
                station: "kb-2".into(),
                identity: None,
            },
        )
        .await
        .unwrap();

        dispatch(
            &state,
            StationCommand::SubmitText {
                station: "kb-1".into(),
                text: "lost but accepted".into(),
            },
        )
        .await
        .unwrap();

        // The buffer kept the text and the next writer was promoted even
        // though the store rejected everything.
        assert_eq!(session_state(&state, "kb-1").await, SessionState::Idle);
        assert_eq!(session_state(&state, "kb-2").await, SessionState::Writing);
        let coordinator = state.lock_coordinator().await;
        assert_eq!(coordinator.story().current_text(), "lost but accepted");
    }

    #[tokio::test]
    async fn degraded_mode_drops_contributions_but_turns_continue() {
        let state = two_station_state();

        join_and_name(&state, "kb-1", "Offline").await;
        dispatch(
            &state,
            StationCommand::SubmitText {
                station: "kb-1".into(),
                text: "nobody listening".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(session_state(&state, "kb-1").await, SessionState::Idle);
    }

    #[tokio::test]
    async fn logout_persists_unsaved_draft() {
        let state = two_station_state();
        let store = Arc::new(MemoryStoryStore::default());
        state.set_story_store(store.clone()).await;

        join_and_name(&state, "kb-1", "Abandoned").await;
        dispatch(
            &state,
            StationCommand::Logout {
                station: "kb-1".into(),
                text: "abc".into(),
            },
        )
        .await
        .unwrap();

        let contributions = store.contributions.lock().unwrap();
        assert_eq!(contributions.len(), 1);
        assert_eq!(contributions[0].text, "abc");
        assert_eq!(contributions[0].identity, "Guest1");
        assert_eq!(
            session_state(&state, "kb-1").await,
            SessionState::LoggedOut
        );
    }

    #[tokio::test]
    async fn registered_login_requires_matching_credential() {
        let state = two_station_state();
        state
            .set_story_store(Arc::new(MemoryStoryStore::default()))
            .await;

        dispatch(
            &state,
            StationCommand::Participate {
                station: "kb-1".into(),
            },
        )
        .await
        .unwrap();

        let denied = login(
            &state,
            "kb-1".into(),
            LoginRequest {
                identity: Some("alice".into()),
                credential: Some("wrong".into()),
            },
        )
        .await;
        assert!(matches!(denied, Err(ServiceError::Unauthorized(_))));

        login(
            &state,
            "kb-1".into(),
            LoginRequest {
                identity: Some("alice".into()),
                credential: Some("secret".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(session_state(&state, "kb-1").await, SessionState::Writing);
    }
}
