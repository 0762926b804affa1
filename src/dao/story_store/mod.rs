#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{ContributionRecord, StoryEntity, StoryListItemEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for stories, writers, and their
/// contribution metrics.
pub trait StoryStore: Send + Sync {
    /// Compare a registered writer's credential; unknown identities fail.
    fn authenticate(
        &self,
        identity: String,
        credential: String,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Create a new story with an empty body, returning its identifier.
    fn create_story(&self, name: String) -> BoxFuture<'static, StorageResult<Uuid>>;
    /// Record one contribution: bump the per-(identity, story) counters and
    /// append the text to the story body. Each call is additive.
    fn save_contribution(
        &self,
        record: ContributionRecord,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn find_story(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<StoryEntity>>>;
    fn list_stories(&self) -> BoxFuture<'static, StorageResult<Vec<StoryListItemEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
