use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{ContributionEntity, StoryEntity, UserEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoStoryDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    body_text: String,
    created_at: DateTime,
    updated_at: DateTime,
}

impl MongoStoryDocument {
    /// Blank story document created before the first contribution lands.
    pub fn new(id: Uuid, name: String) -> Self {
        let now = DateTime::now();
        Self {
            id,
            name,
            body_text: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<MongoStoryDocument> for StoryEntity {
    fn from(value: MongoStoryDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            body_text: value.body_text,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    pub nickname: String,
    pub password: String,
}

impl From<MongoUserDocument> for UserEntity {
    fn from(value: MongoUserDocument) -> Self {
        Self {
            nickname: value.nickname,
            password: value.password,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoContributionDocument {
    pub identity: String,
    pub story_id: Uuid,
    pub chars_contributed: i64,
    pub chars_trashed: i64,
    pub updated_at: DateTime,
}

impl From<MongoContributionDocument> for ContributionEntity {
    fn from(value: MongoContributionDocument) -> Self {
        Self {
            identity: value.identity,
            story_id: value.story_id,
            chars_contributed: value.chars_contributed.max(0) as u64,
            chars_trashed: value.chars_trashed.max(0) as u64,
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
