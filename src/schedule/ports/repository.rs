//! Repository port for the task dependency graph store.

use crate::schedule::domain::{DependencyEdge, NewTask, Task, TaskId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for graph repository operations.
pub type GraphRepositoryResult<T> = Result<T, GraphRepositoryError>;

/// A task together with its direct graph neighbourhood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskWithEdges {
    /// The task record.
    pub task: Task,
    /// Identifiers of tasks this task depends on, ascending.
    pub dependencies: Vec<TaskId>,
    /// Identifiers of tasks depending on this task, ascending.
    pub dependents: Vec<TaskId>,
}

/// Persistence contract for tasks and their dependency edges.
///
/// The scheduling services treat this as the single holder of graph state:
/// they read tasks and edges through it and hand derived attributes back to
/// it for persistence. Implementations serialize concurrent mutations (lock
/// or transaction); a single operation observes a consistent snapshot.
#[async_trait]
pub trait TaskGraphRepository: Send + Sync {
    /// Stores a new task and assigns its identifier.
    async fn insert_task(&self, new_task: &NewTask) -> GraphRepositoryResult<Task>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> GraphRepositoryResult<Option<Task>>;

    /// Finds a task together with its direct dependencies and dependents.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_with_edges(&self, id: TaskId) -> GraphRepositoryResult<Option<TaskWithEdges>>;

    /// Returns every task, ascending by identifier.
    async fn list_tasks(&self) -> GraphRepositoryResult<Vec<Task>>;

    /// Returns every dependency edge.
    async fn list_edges(&self) -> GraphRepositoryResult<Vec<DependencyEdge>>;

    /// Returns the identifiers of the tasks `id` depends on, ascending.
    ///
    /// An unknown identifier yields an empty list: a missing task has no
    /// dependencies to traverse.
    async fn dependency_ids_of(&self, id: TaskId) -> GraphRepositoryResult<Vec<TaskId>>;

    /// Adds a dependency edge. Adding an edge that already exists is a
    /// no-op.
    async fn add_edge(&self, edge: DependencyEdge) -> GraphRepositoryResult<()>;

    /// Removes a dependency edge. Removing an edge that was never added is
    /// a no-op.
    async fn remove_edge(&self, edge: DependencyEdge) -> GraphRepositoryResult<()>;

    /// Persists a task's derived earliest-start date.
    ///
    /// # Errors
    ///
    /// Returns [`GraphRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn update_earliest_start(
        &self,
        id: TaskId,
        earliest_start: Option<DateTime<Utc>>,
    ) -> GraphRepositoryResult<()>;

    /// Replaces the set of critical-path flags in one batch: every flag is
    /// cleared and the listed tasks are marked, without exposing a partially
    /// updated graph to concurrent readers.
    ///
    /// Identifiers without a task record are ignored.
    async fn replace_critical_set(&self, critical: &[TaskId]) -> GraphRepositoryResult<()>;

    /// Deletes a task and cascades the removal of every edge touching it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn delete_task(&self, id: TaskId) -> GraphRepositoryResult<()>;
}

/// Errors returned by graph repository implementations.
#[derive(Debug, Clone, Error)]
pub enum GraphRepositoryError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl GraphRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
