//! Task repository
//!
//! Tasks are read as raw documents: the dashboard passes them through
//! unchanged, so no schema is imposed here.

use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use super::DbError;
use crate::db::TASKS_COLLECTION;

/// Read access to task documents (testable)
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Every task document, unfiltered.
    async fn find_all(&self) -> Result<Vec<Document>, DbError>;
}

/// MongoDB-backed task store
#[derive(Clone)]
pub struct TaskRepo {
    collection: Collection<Document>,
}

impl TaskRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(TASKS_COLLECTION),
        }
    }
}

#[async_trait]
impl TaskStore for TaskRepo {
    async fn find_all(&self) -> Result<Vec<Document>, DbError> {
        let cursor = self.collection.find(doc! {}).await?;
        let tasks: Vec<Document> = cursor.try_collect().await?;

        tracing::debug!(count = tasks.len(), "Fetched tasks");
        Ok(tasks)
    }
}

/// Mock task store for testing
pub struct MockTaskStore {
    tasks: Option<Vec<Document>>,
}

impl MockTaskStore {
    /// Store that returns the given documents
    pub fn with_tasks(tasks: Vec<Document>) -> Self {
        Self { tasks: Some(tasks) }
    }

    /// Store whose queries always fail
    pub fn failing() -> Self {
        Self { tasks: None }
    }
}

#[async_trait]
impl TaskStore for MockTaskStore {
    async fn find_all(&self) -> Result<Vec<Document>, DbError> {
        self.tasks
            .clone()
            .ok_or_else(|| DbError::unavailable("mock task store is down"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_client;

    #[tokio::test]
    async fn mock_returns_tasks() {
        let store = MockTaskStore::with_tasks(vec![doc! { "description": "a" }]);
        let tasks = store.find_all().await.unwrap();
        assert_eq!(tasks, vec![doc! { "description": "a" }]);
    }

    #[tokio::test]
    async fn mock_failure() {
        let store = MockTaskStore::failing();
        assert!(matches!(store.find_all().await, Err(DbError::Mongo(_))));
    }

    // Integration tests - run with MONGODB_URI set
    // cargo test -p taskboard-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn find_all_returns_inserted_tasks() {
        let uri = std::env::var("MONGODB_URI").expect("MONGODB_URI required");
        let client = create_client(&uri).await.unwrap();
        let db = client.database("taskboard_test_tasks_find_all");
        db.drop().await.unwrap();

        let inserted = vec![
            doc! { "description": "first", "completed": false },
            doc! { "description": "second", "completed": true },
        ];
        db.collection::<Document>(TASKS_COLLECTION)
            .insert_many(inserted.clone())
            .await
            .unwrap();

        let tasks = TaskRepo::new(&db).find_all().await.unwrap();
        let descriptions: Vec<_> = tasks
            .iter()
            .map(|t| t.get_str("description").unwrap())
            .collect();
        assert_eq!(descriptions, vec!["first", "second"]);

        db.drop().await.unwrap();
    }
}
