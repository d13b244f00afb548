//! Chat history persistence.
//!
//! `ChatStore` is the seam handlers depend on. `MongoChatStore` is the
//! production backend; `InMemoryChatStore` backs tests and local runs.

use crate::models::ChatRecord;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc, options::IndexOptions, Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;
use std::sync::Mutex;

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn insert(&self, record: &ChatRecord) -> Result<(), AppError>;

    /// All records for `username`, in whatever order the backend yields them.
    async fn find_by_username(&self, username: &str) -> Result<Vec<ChatRecord>, AppError>;

    /// Returns the number of records removed.
    async fn delete_by_username(&self, username: &str) -> Result<u64, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

fn db_error(action: &str, e: mongodb::error::Error) -> AppError {
    tracing::error!("Failed to {}: {}", action, e);
    AppError::DatabaseError(anyhow::Error::new(e).context(format!("Failed to {}", action)))
}

#[derive(Clone)]
pub struct MongoChatStore {
    client: MongoClient,
    db: Database,
    collection: String,
}

impl MongoChatStore {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri)
            .await
            .map_err(|e| db_error("connect to MongoDB", e))?;
        let db = client.database(database);

        let store = Self {
            client,
            db,
            collection: collection.to_string(),
        };

        // The driver connects lazily; ping so a bad URI fails at startup.
        store.health_check().await?;
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(store)
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for chat-service");

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(
                IndexOptions::builder()
                    .name("username_idx".to_string())
                    .build(),
            )
            .build();

        self.chats()
            .create_index(username_index, None)
            .await
            .map_err(|e| db_error("create username index", e))?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    pub fn chats(&self) -> Collection<ChatRecord> {
        self.db.collection(&self.collection)
    }

    /// Drop the backing database. Used by integration tests for cleanup.
    pub async fn drop_database(&self) -> Result<(), AppError> {
        self.db
            .drop(None)
            .await
            .map_err(|e| db_error("drop database", e))
    }
}

#[async_trait]
impl ChatStore for MongoChatStore {
    async fn insert(&self, record: &ChatRecord) -> Result<(), AppError> {
        self.chats()
            .insert_one(record, None)
            .await
            .map_err(|e| db_error("insert chat record", e))?;
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Vec<ChatRecord>, AppError> {
        let cursor = self
            .chats()
            .find(doc! { "username": username }, None)
            .await
            .map_err(|e| db_error("query chat history", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| db_error("collect chat history", e))
    }

    async fn delete_by_username(&self, username: &str) -> Result<u64, AppError> {
        let result = self
            .chats()
            .delete_many(doc! { "username": username }, None)
            .await
            .map_err(|e| db_error("delete chat history", e))?;

        Ok(result.deleted_count)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| db_error("ping MongoDB", e))?;
        Ok(())
    }
}

/// Process-local store that keeps insertion order.
#[derive(Default)]
pub struct InMemoryChatStore {
    records: Mutex<Vec<ChatRecord>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<ChatRecord>>, AppError> {
        self.records.lock().map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("In-memory store mutex poisoned: {}", e))
        })
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<ChatRecord> {
        self.lock().map(|records| records.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn insert(&self, record: &ChatRecord) -> Result<(), AppError> {
        self.lock()?.push(record.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Vec<ChatRecord>, AppError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|r| r.username == username)
            .cloned()
            .collect())
    }

    async fn delete_by_username(&self, username: &str) -> Result<u64, AppError> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|r| r.username != username);
        Ok((before - records.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}
