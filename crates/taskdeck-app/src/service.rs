//! Lifecycle operations over tasks and todos.
//!
//! Every mutating operation runs the capability gate first, then exhaustive
//! validation, then exactly one store call. Reads are unrestricted.

use crate::store::{EntityStore, StoreError};
use std::sync::Arc;
use taskdeck_core::id::{TaskId, TodoId};
use taskdeck_core::{EntityKind, Role, Task, TaskInput, Todo, TodoInput, ValidationError};
use thiserror::Error;
use tracing::debug;

/// Failures surfaced by the lifecycle service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller's role is outside the allowed set for a mutating operation.
    #[error("access denied: insufficient permissions")]
    AccessDenied,

    /// One or more required fields were missing or malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation targeted an id that matches no document.
    #[error("{kind} not found")]
    NotFound {
        /// Collection the id was looked up in.
        kind: EntityKind,
    },

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service façade over the entity store, shared by the HTTP handlers.
pub struct LifecycleService {
    store: Arc<dyn EntityStore>,
}

impl LifecycleService {
    /// Wrap a store handle.
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    fn authorize(role: Role) -> Result<(), ServiceError> {
        if role.may_mutate() {
            Ok(())
        } else {
            debug!(%role, "mutating call rejected");
            Err(ServiceError::AccessDenied)
        }
    }

    fn found(matched: bool, kind: EntityKind) -> Result<(), ServiceError> {
        if matched {
            Ok(())
        } else {
            Err(ServiceError::NotFound { kind })
        }
    }

    /// Validate and persist a new task. `completed` is always false.
    ///
    /// # Errors
    /// Returns [`ServiceError::AccessDenied`] for non-mutating roles,
    /// [`ServiceError::Validation`] with every violated field, or a store
    /// failure.
    pub async fn create_task(&self, role: Role, input: TaskInput) -> Result<Task, ServiceError> {
        Self::authorize(role)?;
        let draft = input.validate()?;
        Ok(self.store.insert_task(draft).await?)
    }

    /// Every task, unfiltered, in store-native order.
    ///
    /// # Errors
    /// Returns a store failure.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(self.store.list_tasks().await?)
    }

    /// Replace a task's title/type/deadline; completion state is untouched.
    ///
    /// # Errors
    /// Gate, validation, [`ServiceError::NotFound`] for unknown ids, or a
    /// store failure.
    pub async fn update_task(
        &self,
        role: Role,
        id: TaskId,
        input: TaskInput,
    ) -> Result<(), ServiceError> {
        Self::authorize(role)?;
        let draft = input.validate()?;
        let matched = self.store.update_task(id, draft).await?;
        Self::found(matched, EntityKind::Task)
    }

    /// Set a task's completion flag. Idempotent.
    ///
    /// # Errors
    /// Gate, [`ServiceError::NotFound`] for unknown ids, or a store failure.
    pub async fn set_task_completed(
        &self,
        role: Role,
        id: TaskId,
        completed: bool,
    ) -> Result<(), ServiceError> {
        Self::authorize(role)?;
        let matched = self.store.set_task_completed(id, completed).await?;
        Self::found(matched, EntityKind::Task)
    }

    /// Remove a task.
    ///
    /// # Errors
    /// Gate, [`ServiceError::NotFound`] when it did not exist, or a store
    /// failure.
    pub async fn delete_task(&self, role: Role, id: TaskId) -> Result<(), ServiceError> {
        Self::authorize(role)?;
        let matched = self.store.delete_task(id).await?;
        Self::found(matched, EntityKind::Task)
    }

    /// Validate and persist a new todo. Absent notes become `""`.
    ///
    /// # Errors
    /// Same failure classes as [`Self::create_task`].
    pub async fn create_todo(&self, role: Role, input: TodoInput) -> Result<Todo, ServiceError> {
        Self::authorize(role)?;
        let draft = input.validate()?;
        Ok(self.store.insert_todo(draft).await?)
    }

    /// Every todo, unfiltered, in store-native order.
    ///
    /// # Errors
    /// Returns a store failure.
    pub async fn list_todos(&self) -> Result<Vec<Todo>, ServiceError> {
        Ok(self.store.list_todos().await?)
    }

    /// Replace a todo's title/notes; completion state is untouched.
    ///
    /// # Errors
    /// Same failure classes as [`Self::update_task`].
    pub async fn update_todo(
        &self,
        role: Role,
        id: TodoId,
        input: TodoInput,
    ) -> Result<(), ServiceError> {
        Self::authorize(role)?;
        let draft = input.validate()?;
        let matched = self.store.update_todo(id, draft).await?;
        Self::found(matched, EntityKind::Todo)
    }

    /// Set a todo's completion flag. Idempotent.
    ///
    /// # Errors
    /// Gate, [`ServiceError::NotFound`] for unknown ids, or a store failure.
    pub async fn set_todo_completed(
        &self,
        role: Role,
        id: TodoId,
        completed: bool,
    ) -> Result<(), ServiceError> {
        Self::authorize(role)?;
        let matched = self.store.set_todo_completed(id, completed).await?;
        Self::found(matched, EntityKind::Todo)
    }

    /// Remove a todo.
    ///
    /// # Errors
    /// Gate, [`ServiceError::NotFound`] when it did not exist, or a store
    /// failure.
    pub async fn delete_todo(&self, role: Role, id: TodoId) -> Result<(), ServiceError> {
        Self::authorize(role)?;
        let matched = self.store.delete_todo(id).await?;
        Self::found(matched, EntityKind::Todo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn service() -> LifecycleService {
        LifecycleService::new(Arc::new(MemoryStore::default()))
    }

    fn task_input() -> TaskInput {
        TaskInput {
            title: Some("Report".into()),
            kind: Some("Work".into()),
            max_end_date: Some("2025-06-01T12:00:00Z".into()),
        }
    }

    #[tokio::test]
    async fn create_task_starts_active() {
        let service = service();
        let task = service
            .create_task(Role::User, task_input())
            .await
            .expect("create must succeed");
        assert!(!task.completed);
        assert_eq!(task.title, "Report");

        let listed = service.list_tasks().await.expect("list must succeed");
        assert_eq!(listed, vec![task]);
    }

    #[tokio::test]
    async fn guest_is_rejected_before_validation() {
        let service = service();
        // Invalid input: if validation ran first this would be a
        // ValidationError, but the gate must win.
        let err = service
            .create_task(Role::Guest, TaskInput::default())
            .await
            .expect_err("guest must be rejected");
        assert!(matches!(err, ServiceError::AccessDenied));

        assert!(service.list_tasks().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn create_reports_every_violation() {
        let service = service();
        let err = service
            .create_task(Role::Admin, TaskInput::default())
            .await
            .expect_err("must fail validation");
        let ServiceError::Validation(validation) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(validation.violations.len(), 3);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let service = service();
        let err = service
            .update_task(Role::Admin, TaskId::new(), task_input())
            .await
            .expect_err("must be not found");
        assert!(matches!(
            err,
            ServiceError::NotFound {
                kind: EntityKind::Task
            }
        ));
    }

    #[tokio::test]
    async fn update_leaves_completion_untouched() {
        let service = service();
        let task = service
            .create_task(Role::User, task_input())
            .await
            .expect("create must succeed");
        service
            .set_task_completed(Role::User, task.id, true)
            .await
            .expect("toggle must succeed");

        let mut input = task_input();
        input.title = Some("Amended report".into());
        service
            .update_task(Role::User, task.id, input)
            .await
            .expect("update must succeed");

        let listed = service.list_tasks().await.expect("list must succeed");
        assert_eq!(listed[0].title, "Amended report");
        assert!(listed[0].completed);
    }

    #[tokio::test]
    async fn toggle_complete_is_idempotent() {
        let service = service();
        let task = service
            .create_task(Role::User, task_input())
            .await
            .expect("create must succeed");

        for _ in 0..2 {
            service
                .set_task_completed(Role::User, task.id, true)
                .await
                .expect("toggle must succeed");
            let listed = service.list_tasks().await.expect("list must succeed");
            assert!(listed[0].completed);
        }
    }

    #[tokio::test]
    async fn deleted_id_fails_every_subsequent_operation() {
        let service = service();
        let task = service
            .create_task(Role::Admin, task_input())
            .await
            .expect("create must succeed");
        service
            .delete_task(Role::Admin, task.id)
            .await
            .expect("delete must succeed");

        let update = service.update_task(Role::Admin, task.id, task_input()).await;
        assert!(matches!(update, Err(ServiceError::NotFound { .. })));
        let toggle = service.set_task_completed(Role::Admin, task.id, true).await;
        assert!(matches!(toggle, Err(ServiceError::NotFound { .. })));
        let delete = service.delete_task(Role::Admin, task.id).await;
        assert!(matches!(delete, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn todo_notes_are_stored_as_empty_string() {
        let service = service();
        let todo = service
            .create_todo(
                Role::User,
                TodoInput {
                    title: Some("Buy milk".into()),
                    notes: None,
                },
            )
            .await
            .expect("create must succeed");
        assert_eq!(todo.notes, "");

        let listed = service.list_todos().await.expect("list must succeed");
        assert_eq!(listed[0].notes, "");
    }

    #[tokio::test]
    async fn todo_toggle_moves_both_directions() {
        let service = service();
        let todo = service
            .create_todo(
                Role::User,
                TodoInput {
                    title: Some("Buy milk".into()),
                    notes: Some("2 liters".into()),
                },
            )
            .await
            .expect("create must succeed");

        service
            .set_todo_completed(Role::User, todo.id, true)
            .await
            .expect("toggle on must succeed");
        service
            .set_todo_completed(Role::User, todo.id, false)
            .await
            .expect("toggle off must succeed");

        let listed = service.list_todos().await.expect("list must succeed");
        assert!(!listed[0].completed);
    }

    #[tokio::test]
    async fn guest_may_list() {
        // list() takes no role at all: reads are open to everyone.
        let service = service();
        assert!(service.list_tasks().await.expect("list").is_empty());
        assert!(service.list_todos().await.expect("list").is_empty());
    }
}
