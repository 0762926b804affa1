//! Service helpers that expose read-only projections of the table state.

use crate::{
    dto::{
        common::StationSummary,
        public::{QueueResponse, StationsResponse, StoriesResponse, StoryResponse},
    },
    error::ServiceError,
    state::SharedState,
};

/// Return the story snapshot shown on the shared display.
pub async fn get_story(state: &SharedState) -> StoryResponse {
    let coordinator = state.lock_coordinator().await;
    let story = coordinator.story();
    StoryResponse {
        name: story.name().map(str::to_string),
        text: story.current_text().to_string(),
        active: story.is_story_active(),
    }
}

/// Return every configured station with its current render state.
pub async fn get_stations(state: &SharedState) -> StationsResponse {
    let coordinator = state.lock_coordinator().await;
    let stations = coordinator
        .sessions()
        .map(|session| {
            StationSummary::from_session(session, session.panels(coordinator.labels()))
        })
        .collect();
    StationsResponse { stations }
}

/// Return the admission queue in turn order.
pub async fn get_queue(state: &SharedState) -> QueueResponse {
    let coordinator = state.lock_coordinator().await;
    QueueResponse {
        stations: coordinator.queue().map(str::to_string).collect(),
        writing: coordinator.writing_station().map(str::to_string),
    }
}

/// Return the stories persisted so far.
pub async fn list_stories(state: &SharedState) -> Result<StoriesResponse, ServiceError> {
    let store = state.story_store().await.ok_or(ServiceError::Degraded)?;
    let stories = store.list_stories().await?;
    Ok(StoriesResponse {
        stories: stories.into_iter().map(Into::into).collect(),
    })
}
