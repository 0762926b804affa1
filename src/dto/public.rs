use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::StoryListItemEntity;
use crate::dto::{common::StationSummary, format_system_time};

/// Snapshot of the story currently on the shared display.
#[derive(Debug, Serialize, ToSchema)]
pub struct StoryResponse {
    /// Name of the pending or created story.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Accumulated body text.
    pub text: String,
    /// Whether the story exists in the store already.
    pub active: bool,
}

/// Admission queue as seen by presentation clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct QueueResponse {
    /// Queued stations, the writer first.
    pub stations: Vec<String>,
    /// Station currently holding the writing turn, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writing: Option<String>,
}

/// All configured stations with their current render state.
#[derive(Debug, Serialize, ToSchema)]
pub struct StationsResponse {
    /// Stations in table order.
    pub stations: Vec<StationSummary>,
}

/// One persisted story in the operator listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct StoryListItem {
    /// Store-assigned identifier.
    pub id: Uuid,
    /// Story name.
    pub name: String,
    /// RFC3339 creation timestamp.
    pub created_at: String,
}

impl From<StoryListItemEntity> for StoryListItem {
    fn from(entity: StoryListItemEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            created_at: format_system_time(entity.created_at),
        }
    }
}

/// Stories persisted so far, newest metadata included.
#[derive(Debug, Serialize, ToSchema)]
pub struct StoriesResponse {
    /// Persisted stories.
    pub stories: Vec<StoryListItem>,
}
