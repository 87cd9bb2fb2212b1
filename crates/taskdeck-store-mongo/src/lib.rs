//! MongoDB-backed storage for taskdeck entities.
//!
//! Documents live in two flat collections (`tasks`, `todos`) with string
//! UUID `_id`s and camelCase field names. Per-document atomicity comes from
//! the server; concurrent updates are last-write-wins.

/// Error types.
pub mod error;

pub use error::MongoStoreError;

use futures::TryStreamExt;
use mongodb::bson::{DateTime as BsonDateTime, doc};
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use taskdeck_core::id::{TaskId, TodoId};
use taskdeck_core::{Task, TaskDraft, Todo, TodoDraft};
use time::OffsetDateTime;
use tracing::debug;

const TASKS_COLLECTION: &str = "tasks";
const TODOS_COLLECTION: &str = "todos";

/// Handle to one database holding the two entity collections.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect to the deployment behind `uri` and select `db_name`.
    ///
    /// The driver connects lazily; use [`Self::check_connection`] to force a
    /// round-trip before serving requests.
    ///
    /// # Errors
    /// Returns a [`MongoStoreError`] when the connection string is invalid.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, MongoStoreError> {
        let client = Client::with_uri_str(uri).await?;
        debug!(db = db_name, "selected database");
        Ok(Self {
            db: client.database(db_name),
        })
    }

    fn tasks(&self) -> Collection<TaskDocument> {
        self.db.collection(TASKS_COLLECTION)
    }

    fn todos(&self) -> Collection<TodoDocument> {
        self.db.collection(TODOS_COLLECTION)
    }

    /// Round-trip probe against the server.
    ///
    /// # Errors
    /// Returns a [`MongoStoreError`] when the server does not answer.
    pub async fn check_connection(&self) -> Result<(), MongoStoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Every task in collection order.
    ///
    /// # Errors
    /// Returns a [`MongoStoreError`] when the find or decode fails.
    pub async fn find_tasks(&self) -> Result<Vec<Task>, MongoStoreError> {
        let documents: Vec<TaskDocument> =
            self.tasks().find(doc! {}).await?.try_collect().await?;
        documents.into_iter().map(TaskDocument::into_task).collect()
    }

    /// Insert a new task with a fresh id and `completed = false`.
    ///
    /// # Errors
    /// Returns a [`MongoStoreError`] when the insert fails.
    pub async fn create_task(&self, draft: TaskDraft) -> Result<Task, MongoStoreError> {
        let document = TaskDocument::from_draft(TaskId::new(), &draft);
        self.tasks().insert_one(&document).await?;
        document.into_task()
    }

    /// Replace title/type/deadline of an existing task.
    ///
    /// # Errors
    /// Returns a [`MongoStoreError`] when the update fails.
    pub async fn replace_task_fields(
        &self,
        id: TaskId,
        draft: TaskDraft,
    ) -> Result<bool, MongoStoreError> {
        let update = doc! { "$set": {
            "title": &draft.title,
            "type": &draft.kind,
            "maxEndDate": BsonDateTime::from_time_0_3(draft.max_end_date),
        } };
        let result = self
            .tasks()
            .update_one(doc! { "_id": id.to_string() }, update)
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Set a task's completion flag.
    ///
    /// # Errors
    /// Returns a [`MongoStoreError`] when the update fails.
    pub async fn set_task_completion(
        &self,
        id: TaskId,
        completed: bool,
    ) -> Result<bool, MongoStoreError> {
        let result = self
            .tasks()
            .update_one(
                doc! { "_id": id.to_string() },
                doc! { "$set": { "completed": completed } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Delete a task document.
    ///
    /// # Errors
    /// Returns a [`MongoStoreError`] when the delete fails.
    pub async fn remove_task(&self, id: TaskId) -> Result<bool, MongoStoreError> {
        let result = self
            .tasks()
            .delete_one(doc! { "_id": id.to_string() })
            .await?;
        Ok(result.deleted_count > 0)
    }

    /// Incomplete tasks with `maxEndDate` in `[from, to]`, bounds inclusive.
    ///
    /// # Errors
    /// Returns a [`MongoStoreError`] when the find or decode fails.
    pub async fn find_tasks_due_between(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<Task>, MongoStoreError> {
        let filter = doc! {
            "completed": false,
            "maxEndDate": {
                "$gte": BsonDateTime::from_time_0_3(from),
                "$lte": BsonDateTime::from_time_0_3(to),
            },
        };
        let documents: Vec<TaskDocument> =
            self.tasks().find(filter).await?.try_collect().await?;
        documents.into_iter().map(TaskDocument::into_task).collect()
    }

    /// Every todo in collection order.
    ///
    /// # Errors
    /// Returns a [`MongoStoreError`] when the find or decode fails.
    pub async fn find_todos(&self) -> Result<Vec<Todo>, MongoStoreError> {
        let documents: Vec<TodoDocument> =
            self.todos().find(doc! {}).await?.try_collect().await?;
        documents.into_iter().map(TodoDocument::into_todo).collect()
    }

    /// Insert a new todo with a fresh id and `completed = false`.
    ///
    /// # Errors
    /// Returns a [`MongoStoreError`] when the insert fails.
    pub async fn create_todo(&self, draft: TodoDraft) -> Result<Todo, MongoStoreError> {
        let document = TodoDocument::from_draft(TodoId::new(), &draft);
        self.todos().insert_one(&document).await?;
        document.into_todo()
    }

    /// Replace title/notes of an existing todo.
    ///
    /// # Errors
    /// Returns a [`MongoStoreError`] when the update fails.
    pub async fn replace_todo_fields(
        &self,
        id: TodoId,
        draft: TodoDraft,
    ) -> Result<bool, MongoStoreError> {
        let update = doc! { "$set": {
            "title": &draft.title,
            "notes": &draft.notes,
        } };
        let result = self
            .todos()
            .update_one(doc! { "_id": id.to_string() }, update)
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Set a todo's completion flag.
    ///
    /// # Errors
    /// Returns a [`MongoStoreError`] when the update fails.
    pub async fn set_todo_completion(
        &self,
        id: TodoId,
        completed: bool,
    ) -> Result<bool, MongoStoreError> {
        let result = self
            .todos()
            .update_one(
                doc! { "_id": id.to_string() },
                doc! { "$set": { "completed": completed } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Delete a todo document.
    ///
    /// # Errors
    /// Returns a [`MongoStoreError`] when the delete fails.
    pub async fn remove_todo(&self, id: TodoId) -> Result<bool, MongoStoreError> {
        let result = self
            .todos()
            .delete_one(doc! { "_id": id.to_string() })
            .await?;
        Ok(result.deleted_count > 0)
    }
}

/// Wire form of a task document.
#[derive(Debug, Serialize, Deserialize)]
struct TaskDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "maxEndDate")]
    max_end_date: BsonDateTime,
    completed: bool,
}

impl TaskDocument {
    fn from_draft(id: TaskId, draft: &TaskDraft) -> Self {
        Self {
            id: id.to_string(),
            title: draft.title.clone(),
            kind: draft.kind.clone(),
            max_end_date: BsonDateTime::from_time_0_3(draft.max_end_date),
            completed: false,
        }
    }

    fn into_task(self) -> Result<Task, MongoStoreError> {
        let id = self
            .id
            .parse::<TaskId>()
            .map_err(|_| MongoStoreError::InvalidId(self.id.clone()))?;
        Ok(Task {
            id,
            title: self.title,
            kind: self.kind,
            max_end_date: self.max_end_date.to_time_0_3(),
            completed: self.completed,
        })
    }
}

/// Wire form of a todo document.
#[derive(Debug, Serialize, Deserialize)]
struct TodoDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    notes: String,
    completed: bool,
}

impl TodoDocument {
    fn from_draft(id: TodoId, draft: &TodoDraft) -> Self {
        Self {
            id: id.to_string(),
            title: draft.title.clone(),
            notes: draft.notes.clone(),
            completed: false,
        }
    }

    fn into_todo(self) -> Result<Todo, MongoStoreError> {
        let id = self
            .id
            .parse::<TodoId>()
            .map_err(|_| MongoStoreError::InvalidId(self.id.clone()))?;
        Ok(Todo {
            id,
            title: self.title,
            notes: self.notes,
            completed: self.completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn task_document_roundtrip() {
        let id = TaskId::new();
        let draft = TaskDraft {
            title: "Report".into(),
            kind: "Work".into(),
            max_end_date: datetime!(2025-06-01 12:00 UTC),
        };
        let document = TaskDocument::from_draft(id, &draft);
        assert!(!document.completed);

        let task = document.into_task().expect("must convert");
        assert_eq!(task.id, id);
        assert_eq!(task.title, "Report");
        assert_eq!(task.kind, "Work");
        assert_eq!(task.max_end_date, datetime!(2025-06-01 12:00 UTC));
    }

    #[test]
    fn task_document_rejects_foreign_id() {
        let document = TaskDocument {
            id: "6565f0a1e4b0c2a1d3f4e5b6".into(),
            title: "Legacy".into(),
            kind: "Work".into(),
            max_end_date: BsonDateTime::from_time_0_3(datetime!(2025-06-01 12:00 UTC)),
            completed: false,
        };
        assert!(matches!(
            document.into_task(),
            Err(MongoStoreError::InvalidId(_))
        ));
    }

    #[test]
    fn todo_document_roundtrip() {
        let id = TodoId::new();
        let draft = TodoDraft {
            title: "Buy milk".into(),
            notes: String::new(),
        };
        let todo = TodoDocument::from_draft(id, &draft)
            .into_todo()
            .expect("must convert");
        assert_eq!(todo.id, id);
        assert_eq!(todo.notes, "");
        assert!(!todo.completed);
    }

    #[test]
    fn task_document_serializes_wire_names() {
        let document = TaskDocument::from_draft(
            TaskId::new(),
            &TaskDraft {
                title: "Report".into(),
                kind: "Work".into(),
                max_end_date: datetime!(2025-06-01 12:00 UTC),
            },
        );
        let bson = mongodb::bson::to_document(&document).expect("must serialize");
        assert!(bson.contains_key("_id"));
        assert!(bson.contains_key("type"));
        assert!(bson.contains_key("maxEndDate"));
    }
}
