use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Aggregate story entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryEntity {
    /// Primary key of the story.
    pub id: Uuid,
    /// Display name supplied when the story was started.
    pub name: String,
    /// Accumulated body text of every accepted contribution.
    pub body_text: String,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the story entity was updated.
    pub updated_at: SystemTime,
}

/// Compact story row used in listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryListItemEntity {
    /// Primary key of the story.
    pub id: Uuid,
    /// Display name supplied when the story was started.
    pub name: String,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
}

/// Stored credentials for a registered writer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Login identity, unique per user.
    pub nickname: String,
    /// Stored credential compared on login.
    pub password: String,
}

/// Per-user, per-story contribution counters kept by the store.
///
/// One document exists per (identity, story) pair; repeated contributions
/// add onto the counters rather than creating new rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContributionEntity {
    /// Identity the counters belong to.
    pub identity: String,
    /// Story the counters belong to.
    pub story_id: Uuid,
    /// Total characters this identity contributed to the story.
    pub chars_contributed: u64,
    /// Total characters this identity discarded while writing the story.
    pub chars_trashed: u64,
    /// Last time the counters were updated.
    pub updated_at: SystemTime,
}

/// One accepted contribution handed to the store for recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionRecord {
    /// Identity the contribution is credited to.
    pub identity: String,
    /// Story the text belongs to.
    pub story_id: Uuid,
    /// Contributed text; may be empty when only discards are recorded.
    pub text: String,
    /// Characters discarded since the identity's previous contribution.
    pub trashed_chars: u64,
}

impl From<StoryEntity> for StoryListItemEntity {
    fn from(entity: StoryEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            created_at: entity.created_at,
        }
    }
}
