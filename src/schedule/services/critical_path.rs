//! Whole-graph critical-path marking.

use super::DerivationError;
use crate::schedule::{
    domain::{CycleInvariantViolated, Task, TaskId},
    ports::TaskGraphRepository,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::error;

/// Recomputes which tasks lie on the critical path.
///
/// Marking a single task critical only makes sense in the context of the
/// full dependency network, so the marker always works over the whole
/// graph: it reads one snapshot of every task and edge, derives the new
/// flag assignment in memory, and persists it as a single batch
/// replacement.
#[derive(Clone)]
pub struct CriticalPathMarker<R>
where
    R: TaskGraphRepository,
{
    repository: Arc<R>,
}

impl<R> CriticalPathMarker<R>
where
    R: TaskGraphRepository,
{
    /// Creates a marker operating through the given repository.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Recomputes and persists the critical-path flags for every task.
    ///
    /// End nodes (tasks with no dependents) anchor the paths; from each,
    /// visited in ascending id order, the marker walks backward marking the
    /// current task and following the dependency with the latest effective
    /// completion date (due date when set, creation date otherwise). Ties
    /// break to the lowest task id. Walks stop at source nodes; tasks
    /// reached from several end nodes are marked once. Tasks referenced by
    /// dangling edges are skipped.
    ///
    /// Returns the identifiers that were marked, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`DerivationError::Invariant`] when a backward walk revisits
    /// a task (a cycle the acyclicity invariant forbids) and
    /// [`DerivationError::Repository`] when the snapshot read or the batch
    /// write fails.
    pub async fn recompute(&self) -> Result<Vec<TaskId>, DerivationError> {
        let tasks = self.repository.list_tasks().await?;
        let edges = self.repository.list_edges().await?;

        let records: BTreeMap<TaskId, Task> =
            tasks.into_iter().map(|task| (task.id(), task)).collect();
        let mut dependencies: BTreeMap<TaskId, Vec<TaskId>> = BTreeMap::new();
        let mut with_dependents: HashSet<TaskId> = HashSet::new();
        for edge in &edges {
            dependencies
                .entry(edge.dependent())
                .or_default()
                .push(edge.dependency());
            with_dependents.insert(edge.dependency());
        }
        for list in dependencies.values_mut() {
            list.sort_unstable();
        }

        let mut critical: BTreeSet<TaskId> = BTreeSet::new();
        let end_nodes = records
            .keys()
            .copied()
            .filter(|id| !with_dependents.contains(id));
        for end_node in end_nodes {
            let mut walk: HashSet<TaskId> = HashSet::new();
            let mut current = end_node;
            loop {
                if !walk.insert(current) {
                    error!(task = %current, "cycle encountered while marking the critical path");
                    return Err(CycleInvariantViolated(current).into());
                }
                critical.insert(current);
                let Some(next) = bottleneck_dependency(current, &dependencies, &records) else {
                    break;
                };
                current = next;
            }
        }

        let marked: Vec<TaskId> = critical.into_iter().collect();
        self.repository.replace_critical_set(&marked).await?;
        Ok(marked)
    }
}

/// Picks the dependency whose effective completion date is latest.
///
/// Dependency lists are scanned in ascending id order with a strict
/// comparison, so equal completion dates keep the lowest id. Returns `None`
/// for source nodes and for tasks whose dependencies all dangle.
fn bottleneck_dependency(
    id: TaskId,
    dependencies: &BTreeMap<TaskId, Vec<TaskId>>,
    records: &BTreeMap<TaskId, Task>,
) -> Option<TaskId> {
    let list = dependencies.get(&id)?;
    let mut best: Option<(TaskId, DateTime<Utc>)> = None;
    for dependency in list {
        let Some(record) = records.get(dependency) else {
            continue;
        };
        let completion = record.effective_completion();
        let improves = best.is_none_or(|(_, best_completion)| completion > best_completion);
        if improves {
            best = Some((*dependency, completion));
        }
    }
    best.map(|(dependency, _)| dependency)
}
