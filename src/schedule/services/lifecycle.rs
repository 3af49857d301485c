//! Service layer for task creation, lookup, and deletion.

use super::CriticalPathMarker;
use crate::schedule::{
    domain::{NewTask, ScheduleDomainError, Task, TaskId},
    ports::{GraphRepositoryError, TaskGraphRepository, TaskWithEdges},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    due_at: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            due_at: None,
        }
    }

    /// Sets the due date.
    #[must_use]
    pub fn with_due_date(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ScheduleDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] GraphRepositoryError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task creation, lookup, and deletion orchestration.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: TaskGraphRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    marker: CriticalPathMarker<R>,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskGraphRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            marker: CriticalPathMarker::new(Arc::clone(&repository)),
            repository,
            clock,
        }
    }

    /// Creates an independent task stamped with the current clock time.
    ///
    /// The graph store assigns the identifier; the task starts with no
    /// edges, no derived earliest start, and an unset critical flag.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the title is invalid or the
    /// repository rejects persistence.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let new_task = NewTask::new(request.title, request.due_at, &*self.clock)?;
        let task = self.repository.insert_task(&new_task).await?;
        Ok(task)
    }

    /// Retrieves a task together with its direct dependencies and
    /// dependents.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn find_task(&self, id: TaskId) -> TaskLifecycleResult<Option<TaskWithEdges>> {
        Ok(self.repository.find_with_edges(id).await?)
    }

    /// Returns every task with its edges, ascending by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when enumeration fails.
    pub async fn list_tasks(&self) -> TaskLifecycleResult<Vec<TaskWithEdges>> {
        let tasks = self.repository.list_tasks().await?;
        let mut expanded = Vec::with_capacity(tasks.len());
        for task in tasks {
            if let Some(with_edges) = self.repository.find_with_edges(task.id()).await? {
                expanded.push(with_edges);
            }
        }
        Ok(expanded)
    }

    /// Deletes a task; the graph store cascades the removal of its edges.
    ///
    /// The edge set changed, so the critical path is recomputed afterwards.
    /// A recompute failure leaves the deletion in place and the flags stale,
    /// mirroring the degraded-not-error policy of dependency edits.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the task does not
    /// exist or the deletion fails.
    pub async fn delete_task(&self, id: TaskId) -> TaskLifecycleResult<()> {
        self.repository.delete_task(id).await?;
        if let Err(err) = self.marker.recompute().await {
            error!(task = %id, error = %err, "critical path left stale after task deletion");
        }
        Ok(())
    }
}
