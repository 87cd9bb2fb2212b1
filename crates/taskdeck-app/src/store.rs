//! Persistence seam for entity documents.
//!
//! The trait is object-safe so the HTTP layer and the reminder scanner can
//! share one `Arc<dyn EntityStore>` regardless of the configured backend.

use async_trait::async_trait;
use taskdeck_core::id::{TaskId, TodoId};
use taskdeck_core::{Task, TaskDraft, Todo, TodoDraft};
use taskdeck_store_mongo::{MongoStore, MongoStoreError};
use thiserror::Error;
use time::OffsetDateTime;

/// Errors bubbled up from a backing document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store failed or rejected the operation.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The store could not be reached at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<MongoStoreError> for StoreError {
    fn from(err: MongoStoreError) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Document persistence operations shared by every backend.
///
/// Update-style operations return `false` when the id matched no document;
/// turning that into a not-found error is the service's job.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Return every task in store-native order.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the collection cannot be read.
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;

    /// Persist a new task with a fresh id and `completed = false`.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the insert fails.
    async fn insert_task(&self, draft: TaskDraft) -> Result<Task, StoreError>;

    /// Replace title/type/deadline, leaving `completed` untouched.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the update fails.
    async fn update_task(&self, id: TaskId, draft: TaskDraft) -> Result<bool, StoreError>;

    /// Set the completion flag to the supplied value.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the update fails.
    async fn set_task_completed(&self, id: TaskId, completed: bool) -> Result<bool, StoreError>;

    /// Remove the task document.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the delete fails.
    async fn delete_task(&self, id: TaskId) -> Result<bool, StoreError>;

    /// Incomplete tasks whose deadline falls within `[from, to]`, both
    /// bounds inclusive.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the query fails.
    async fn tasks_due_between(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<Task>, StoreError>;

    /// Return every todo in store-native order.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the collection cannot be read.
    async fn list_todos(&self) -> Result<Vec<Todo>, StoreError>;

    /// Persist a new todo with a fresh id and `completed = false`.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the insert fails.
    async fn insert_todo(&self, draft: TodoDraft) -> Result<Todo, StoreError>;

    /// Replace title/notes, leaving `completed` untouched.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the update fails.
    async fn update_todo(&self, id: TodoId, draft: TodoDraft) -> Result<bool, StoreError>;

    /// Set the completion flag to the supplied value.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the update fails.
    async fn set_todo_completed(&self, id: TodoId, completed: bool) -> Result<bool, StoreError>;

    /// Remove the todo document.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the delete fails.
    async fn delete_todo(&self, id: TodoId) -> Result<bool, StoreError>;

    /// Cheap reachability probe used by the startup gate and the readiness
    /// endpoint.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] when the store does not answer.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl EntityStore for MongoStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.find_tasks().await.map_err(Into::into)
    }

    async fn insert_task(&self, draft: TaskDraft) -> Result<Task, StoreError> {
        self.create_task(draft).await.map_err(Into::into)
    }

    async fn update_task(&self, id: TaskId, draft: TaskDraft) -> Result<bool, StoreError> {
        self.replace_task_fields(id, draft).await.map_err(Into::into)
    }

    async fn set_task_completed(&self, id: TaskId, completed: bool) -> Result<bool, StoreError> {
        self.set_task_completion(id, completed).await.map_err(Into::into)
    }

    async fn delete_task(&self, id: TaskId) -> Result<bool, StoreError> {
        self.remove_task(id).await.map_err(Into::into)
    }

    async fn tasks_due_between(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<Task>, StoreError> {
        self.find_tasks_due_between(from, to).await.map_err(Into::into)
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, StoreError> {
        self.find_todos().await.map_err(Into::into)
    }

    async fn insert_todo(&self, draft: TodoDraft) -> Result<Todo, StoreError> {
        self.create_todo(draft).await.map_err(Into::into)
    }

    async fn update_todo(&self, id: TodoId, draft: TodoDraft) -> Result<bool, StoreError> {
        self.replace_todo_fields(id, draft).await.map_err(Into::into)
    }

    async fn set_todo_completed(&self, id: TodoId, completed: bool) -> Result<bool, StoreError> {
        self.set_todo_completion(id, completed).await.map_err(Into::into)
    }

    async fn delete_todo(&self, id: TodoId) -> Result<bool, StoreError> {
        self.remove_todo(id).await.map_err(Into::into)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_connection()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))
    }
}
