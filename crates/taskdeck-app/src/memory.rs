//! In-process store backend.
//!
//! Serves the test suites and the `memory` store URI for local development.
//! UUID v7 keys keep iteration in creation order, matching the "store-native
//! order" the list operations promise.

use crate::store::{EntityStore, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use taskdeck_core::id::{TaskId, TodoId};
use taskdeck_core::{Task, TaskDraft, Todo, TodoDraft};
use time::OffsetDateTime;

/// Mutex-protected in-memory collections.
#[derive(Default)]
pub struct MemoryStore {
    tasks: Mutex<BTreeMap<TaskId, Task>>,
    todos: Mutex<BTreeMap<TodoId, Todo>>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(guard(&self.tasks).values().cloned().collect())
    }

    async fn insert_task(&self, draft: TaskDraft) -> Result<Task, StoreError> {
        let task = Task {
            id: TaskId::new(),
            title: draft.title,
            kind: draft.kind,
            max_end_date: draft.max_end_date,
            completed: false,
        };
        guard(&self.tasks).insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: TaskId, draft: TaskDraft) -> Result<bool, StoreError> {
        Ok(guard(&self.tasks).get_mut(&id).is_some_and(|task| {
            task.title = draft.title;
            task.kind = draft.kind;
            task.max_end_date = draft.max_end_date;
            true
        }))
    }

    async fn set_task_completed(&self, id: TaskId, completed: bool) -> Result<bool, StoreError> {
        Ok(guard(&self.tasks).get_mut(&id).is_some_and(|task| {
            task.completed = completed;
            true
        }))
    }

    async fn delete_task(&self, id: TaskId) -> Result<bool, StoreError> {
        Ok(guard(&self.tasks).remove(&id).is_some())
    }

    async fn tasks_due_between(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<Task>, StoreError> {
        Ok(guard(&self.tasks)
            .values()
            .filter(|task| !task.completed && task.max_end_date >= from && task.max_end_date <= to)
            .cloned()
            .collect())
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(guard(&self.todos).values().cloned().collect())
    }

    async fn insert_todo(&self, draft: TodoDraft) -> Result<Todo, StoreError> {
        let todo = Todo {
            id: TodoId::new(),
            title: draft.title,
            notes: draft.notes,
            completed: false,
        };
        guard(&self.todos).insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn update_todo(&self, id: TodoId, draft: TodoDraft) -> Result<bool, StoreError> {
        Ok(guard(&self.todos).get_mut(&id).is_some_and(|todo| {
            todo.title = draft.title;
            todo.notes = draft.notes;
            true
        }))
    }

    async fn set_todo_completed(&self, id: TodoId, completed: bool) -> Result<bool, StoreError> {
        Ok(guard(&self.todos).get_mut(&id).is_some_and(|todo| {
            todo.completed = completed;
            true
        }))
    }

    async fn delete_todo(&self, id: TodoId) -> Result<bool, StoreError> {
        Ok(guard(&self.todos).remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn task_draft(title: &str, deadline: OffsetDateTime) -> TaskDraft {
        TaskDraft {
            title: title.into(),
            kind: "Work".into(),
            max_end_date: deadline,
        }
    }

    #[tokio::test]
    async fn insert_assigns_fresh_id_and_active_state() {
        let store = MemoryStore::default();
        let now = OffsetDateTime::now_utc();
        let task = store
            .insert_task(task_draft("Report", now))
            .await
            .expect("insert must succeed");
        assert!(!task.completed);

        let listed = store.list_tasks().await.expect("list must succeed");
        assert_eq!(listed, vec![task]);
    }

    #[tokio::test]
    async fn list_preserves_creation_order() {
        let store = MemoryStore::default();
        let now = OffsetDateTime::now_utc();
        for title in ["first", "second", "third"] {
            store
                .insert_task(task_draft(title, now))
                .await
                .expect("insert must succeed");
        }
        let titles: Vec<String> = store
            .list_tasks()
            .await
            .expect("list must succeed")
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn update_misses_unknown_id() {
        let store = MemoryStore::default();
        let matched = store
            .update_task(TaskId::new(), task_draft("x", OffsetDateTime::now_utc()))
            .await
            .expect("update must not error");
        assert!(!matched);
    }

    #[tokio::test]
    async fn due_window_is_inclusive_and_skips_completed() {
        let store = MemoryStore::default();
        let now = OffsetDateTime::now_utc();
        let horizon = now + Duration::hours(24);

        let at_lower = store
            .insert_task(task_draft("lower", now))
            .await
            .expect("insert must succeed");
        let at_upper = store
            .insert_task(task_draft("upper", horizon))
            .await
            .expect("insert must succeed");
        store
            .insert_task(task_draft("beyond", horizon + Duration::seconds(1)))
            .await
            .expect("insert must succeed");
        let done = store
            .insert_task(task_draft("done", now + Duration::hours(1)))
            .await
            .expect("insert must succeed");
        store
            .set_task_completed(done.id, true)
            .await
            .expect("toggle must succeed");

        let due: Vec<TaskId> = store
            .tasks_due_between(now, horizon)
            .await
            .expect("query must succeed")
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(due, vec![at_lower.id, at_upper.id]);
    }
}
