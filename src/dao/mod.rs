/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Story, user, and contribution storage operations.
pub mod story_store;
