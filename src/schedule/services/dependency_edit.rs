//! Orchestration of dependency edits and the recompute sequence.

use super::{
    CriticalPathMarker, CycleDetector, DerivationError, EarliestStartCalculator,
};
use crate::schedule::{
    domain::{DependencyEdge, Task, TaskId},
    ports::{GraphRepositoryError, TaskGraphRepository},
};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// Validated dependency edit payload.
///
/// The core owns no wire format, but its boundary contract is a task
/// identifier plus an array of dependency identifiers; [`Self::from_json`]
/// enforces the array shape for callers that receive raw JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEditRequest {
    task_id: TaskId,
    dependency_ids: Vec<TaskId>,
}

impl DependencyEditRequest {
    /// Creates a request from already-typed identifiers.
    #[must_use]
    pub const fn new(task_id: TaskId, dependency_ids: Vec<TaskId>) -> Self {
        Self {
            task_id,
            dependency_ids,
        }
    }

    /// Parses the dependency list from a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyEditError::InvalidInput`] when the payload is not
    /// an array of integers.
    pub fn from_json(task_id: TaskId, payload: &Value) -> Result<Self, DependencyEditError> {
        let Some(items) = payload.as_array() else {
            return Err(DependencyEditError::InvalidInput(
                "dependency list must be an array".to_owned(),
            ));
        };
        let mut dependency_ids = Vec::with_capacity(items.len());
        for item in items {
            let Some(raw) = item.as_i64() else {
                return Err(DependencyEditError::InvalidInput(format!(
                    "dependency id must be an integer, got {item}"
                )));
            };
            dependency_ids.push(TaskId::new(raw));
        }
        Ok(Self::new(task_id, dependency_ids))
    }

    /// Returns the task being edited.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the dependency identifiers named by the request.
    #[must_use]
    pub fn dependency_ids(&self) -> &[TaskId] {
        &self.dependency_ids
    }
}

/// Errors rejecting a dependency edit before any edge is committed.
#[derive(Debug, Clone, Error)]
pub enum DependencyEditError {
    /// The task was listed as its own dependency.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// Adding the edge would close a dependency cycle.
    #[error("depending on task {dependency} would create a cycle")]
    CycleDetected {
        /// The candidate dependency that closes the loop.
        dependency: TaskId,
    },

    /// A referenced task identifier does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The dependency list was not a well-formed array of integers.
    #[error("invalid dependency list: {0}")]
    InvalidInput(String),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] GraphRepositoryError),
}

/// Whether derived attributes reflect the committed edge set.
///
/// A derivation failure after a successful mutation leaves the edges in
/// place; the caller sees a `Stale` outcome rather than an error, and the
/// attributes catch up on the next successful recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedFreshness {
    /// Earliest starts and critical flags were recomputed and persisted.
    Fresh,
    /// The edge mutation committed but the recompute failed; derived
    /// attributes are stale until the next edit.
    Stale,
}

/// Result of a successful dependency edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEditOutcome {
    task: Task,
    freshness: DerivedFreshness,
}

impl DependencyEditOutcome {
    /// Returns the edited task as last read from the store.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns whether derived attributes were refreshed.
    #[must_use]
    pub const fn freshness(&self) -> DerivedFreshness {
        self.freshness
    }
}

/// Coordinates dependency edits: validation, edge mutation, and the
/// recompute-and-persist sequence for derived attributes.
#[derive(Clone)]
pub struct DependencyEditService<R>
where
    R: TaskGraphRepository,
{
    repository: Arc<R>,
    detector: CycleDetector<R>,
    calculator: EarliestStartCalculator<R>,
    marker: CriticalPathMarker<R>,
}

impl<R> DependencyEditService<R>
where
    R: TaskGraphRepository,
{
    /// Creates an edit service over the given repository.
    #[must_use]
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            detector: CycleDetector::new(Arc::clone(&repository)),
            calculator: EarliestStartCalculator::new(Arc::clone(&repository)),
            marker: CriticalPathMarker::new(Arc::clone(&repository)),
            repository,
        }
    }

    /// Adds the requested dependency edges.
    ///
    /// All candidates are validated before anything is committed: the edited
    /// task and every dependency must exist, none may equal the edited task,
    /// and none may close a cycle. When any candidate fails, the whole call
    /// fails naming the offender and no edge is committed. Duplicate
    /// candidates collapse to a single edge.
    ///
    /// On success the edited task's earliest start is recomputed and
    /// persisted, followed by a whole-graph critical-path recompute.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyEditError`] when validation or an edge mutation
    /// fails. Recompute failures after the edges are committed do not fail
    /// the call; they surface as [`DerivedFreshness::Stale`].
    pub async fn add_dependencies(
        &self,
        request: &DependencyEditRequest,
    ) -> Result<DependencyEditOutcome, DependencyEditError> {
        let task_id = request.task_id();
        let task = self.require_task(task_id).await?;
        let edges = collect_edges(task_id, request.dependency_ids())?;

        for edge in &edges {
            let dependency = edge.dependency();
            if self.repository.find_by_id(dependency).await?.is_none() {
                return Err(DependencyEditError::TaskNotFound(dependency));
            }
        }
        for edge in &edges {
            let dependency = edge.dependency();
            if self
                .detector
                .would_create_cycle(edge.dependent(), dependency)
                .await?
            {
                return Err(DependencyEditError::CycleDetected { dependency });
            }
        }

        for edge in &edges {
            self.repository.add_edge(*edge).await?;
        }

        Ok(self.conclude(task_id, task).await)
    }

    /// Removes the requested dependency edges.
    ///
    /// Removal cannot introduce a cycle, so there is no cycle precondition;
    /// edges that were never added are skipped silently. The recompute
    /// sequence still runs, since the edge set may have changed.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyEditError::TaskNotFound`] when the edited task
    /// does not exist, [`DependencyEditError::SelfDependency`] when the task
    /// names itself (such an edge can never exist), and repository errors
    /// from the edge mutations.
    pub async fn remove_dependencies(
        &self,
        request: &DependencyEditRequest,
    ) -> Result<DependencyEditOutcome, DependencyEditError> {
        let task_id = request.task_id();
        let task = self.require_task(task_id).await?;
        let edges = collect_edges(task_id, request.dependency_ids())?;

        for edge in &edges {
            self.repository.remove_edge(*edge).await?;
        }

        Ok(self.conclude(task_id, task).await)
    }

    async fn require_task(&self, task_id: TaskId) -> Result<Task, DependencyEditError> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(DependencyEditError::TaskNotFound(task_id))
    }

    /// Runs the recompute sequence and assembles the outcome, downgrading
    /// post-mutation failures to a stale marker.
    async fn conclude(&self, task_id: TaskId, fallback: Task) -> DependencyEditOutcome {
        let freshness = match self.refresh_derived(task_id).await {
            Ok(()) => DerivedFreshness::Fresh,
            Err(err) => {
                error!(
                    task = %task_id,
                    error = %err,
                    "edges committed but derived attributes are stale"
                );
                DerivedFreshness::Stale
            }
        };
        let task = self
            .repository
            .find_by_id(task_id)
            .await
            .ok()
            .flatten()
            .unwrap_or(fallback);
        DependencyEditOutcome { task, freshness }
    }

    async fn refresh_derived(&self, task_id: TaskId) -> Result<(), DerivationError> {
        let earliest = self.calculator.earliest_start(task_id).await?;
        self.repository
            .update_earliest_start(task_id, earliest)
            .await
            .map_err(DerivationError::from)?;
        self.marker.recompute().await?;
        Ok(())
    }
}

/// Builds the deduplicated edge set for an edit, rejecting self-references.
fn collect_edges(
    task_id: TaskId,
    dependency_ids: &[TaskId],
) -> Result<BTreeSet<DependencyEdge>, DependencyEditError> {
    let mut edges = BTreeSet::new();
    for dependency_id in dependency_ids {
        let edge = DependencyEdge::new(task_id, *dependency_id)
            .map_err(|_| DependencyEditError::SelfDependency(task_id))?;
        edges.insert(edge);
    }
    Ok(edges)
}
