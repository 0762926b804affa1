use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoContributionDocument, MongoStoryDocument, MongoUserDocument, doc_id, uuid_as_binary},
};
use crate::dao::{
    models::{ContributionRecord, StoryEntity, StoryListItemEntity},
    storage::StorageResult,
    story_store::StoryStore,
};

const STORY_COLLECTION_NAME: &str = "stories";
const USER_COLLECTION_NAME: &str = "users";
const CONTRIBUTION_COLLECTION_NAME: &str = "contributions";

#[derive(Clone)]
pub struct MongoStoryStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoStoryStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let stories = database.collection::<mongodb::bson::Document>(STORY_COLLECTION_NAME);
        let story_index = mongodb::IndexModel::builder()
            .keys(doc! {"name": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("story_name_idx".to_owned()))
                    .build(),
            )
            .build();
        stories
            .create_index(story_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: STORY_COLLECTION_NAME,
                index: "name",
                source,
            })?;

        let users = database.collection::<MongoUserDocument>(USER_COLLECTION_NAME);
        let user_index = mongodb::IndexModel::builder()
            .keys(doc! {"nickname": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("user_nickname_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        users
            .create_index(user_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: USER_COLLECTION_NAME,
                index: "nickname",
                source,
            })?;

        // One counter document per (identity, story) pair.
        let contributions =
            database.collection::<MongoContributionDocument>(CONTRIBUTION_COLLECTION_NAME);
        let contribution_index = mongodb::IndexModel::builder()
            .keys(doc! {"identity": 1, "story_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("contribution_identity_story_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        contributions
            .create_index(contribution_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: CONTRIBUTION_COLLECTION_NAME,
                index: "identity,story_id",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn story_collection(&self) -> Collection<MongoStoryDocument> {
        self.database()
            .await
            .collection::<MongoStoryDocument>(STORY_COLLECTION_NAME)
    }

    async fn user_collection(&self) -> Collection<MongoUserDocument> {
        self.database()
            .await
            .collection::<MongoUserDocument>(USER_COLLECTION_NAME)
    }

    async fn contribution_collection(&self) -> Collection<MongoContributionDocument> {
        self.database()
            .await
            .collection::<MongoContributionDocument>(CONTRIBUTION_COLLECTION_NAME)
    }

    async fn authenticate(&self, identity: String, credential: String) -> MongoResult<bool> {
        let users = self.user_collection().await;
        let user = users
            .find_one(doc! {"nickname": &identity})
            .await
            .map_err(|source| MongoDaoError::FindUser { identity, source })?;

        Ok(user.is_some_and(|user| user.password == credential))
    }

    async fn create_story(&self, name: String) -> MongoResult<Uuid> {
        let id = Uuid::new_v4();
        let document = MongoStoryDocument::new(id, name.clone());

        let stories = self.story_collection().await;
        stories
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::CreateStory { name, source })?;

        Ok(id)
    }

    async fn save_contribution(&self, record: ContributionRecord) -> MongoResult<()> {
        let as_error = |source| MongoDaoError::SaveContribution {
            identity: record.identity.clone(),
            story_id: record.story_id,
            source,
        };

        // Counter upsert: first contribution of this identity to this story
        // creates the document, later ones add onto it.
        let contributions = self.contribution_collection().await;
        contributions
            .update_one(
                doc! {
                    "identity": &record.identity,
                    "story_id": uuid_as_binary(record.story_id),
                },
                doc! {
                    "$inc": {
                        "chars_contributed": record.text.chars().count() as i64,
                        "chars_trashed": record.trashed_chars as i64,
                    },
                    "$currentDate": { "updated_at": true },
                },
            )
            .upsert(true)
            .await
            .map_err(as_error)?;

        if record.text.is_empty() {
            return Ok(());
        }

        // Append the text to the story body, separating with a space unless
        // the body is still empty.
        let stories = self.story_collection().await;
        stories
            .update_one(
                doc_id(record.story_id),
                vec![doc! {
                    "$set": {
                        "body_text": {
                            "$concat": [
                                "$body_text",
                                { "$cond": [{ "$eq": ["$body_text", ""] }, "", " "] },
                                &record.text,
                            ],
                        },
                        "updated_at": "$$NOW",
                    },
                }],
            )
            .await
            .map_err(as_error)?;

        Ok(())
    }

    async fn find_story(&self, id: Uuid) -> MongoResult<Option<StoryEntity>> {
        let stories = self.story_collection().await;
        let document = stories
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadStory { id, source })?;

        Ok(document.map(Into::into))
    }

    async fn list_stories(&self) -> MongoResult<Vec<StoryListItemEntity>> {
        let stories = self.story_collection().await;

        let documents: Vec<MongoStoryDocument> = stories
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListStories { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListStories { source })?;

        Ok(documents
            .into_iter()
            .map(|document| {
                let entity: StoryEntity = document.into();
                entity.into()
            })
            .collect())
    }
}

impl StoryStore for MongoStoryStore {
    fn authenticate(
        &self,
        identity: String,
        credential: String,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .authenticate(identity, credential)
                .await
                .map_err(Into::into)
        })
    }

    fn create_story(&self, name: String) -> BoxFuture<'static, StorageResult<Uuid>> {
        let store = self.clone();
        Box::pin(async move { store.create_story(name).await.map_err(Into::into) })
    }

    fn save_contribution(
        &self,
        record: ContributionRecord,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_contribution(record).await.map_err(Into::into) })
    }

    fn find_story(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<StoryEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_story(id).await.map_err(Into::into) })
    }

    fn list_stories(&self) -> BoxFuture<'static, StorageResult<Vec<StoryListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_stories().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
