//! Earliest-start derivation over the dependency graph.

use super::DerivationError;
use crate::schedule::{
    domain::{CycleInvariantViolated, Task, TaskId},
    ports::TaskGraphRepository,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::error;

/// Worklist frame: enter a node, or resolve it after its dependencies.
enum Frame {
    Enter(TaskId),
    Resolve(TaskId),
}

/// Derives the earliest date a task could begin from its dependency chain.
#[derive(Clone)]
pub struct EarliestStartCalculator<R>
where
    R: TaskGraphRepository,
{
    repository: Arc<R>,
}

impl<R> EarliestStartCalculator<R>
where
    R: TaskGraphRepository,
{
    /// Creates a calculator reading through the given repository.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Computes the earliest start date of `task_id`.
    ///
    /// A task with no dependencies can start at its own creation date. A
    /// task with dependencies can start once the latest of its dependencies
    /// is finished: each dependency contributes its own derived earliest
    /// start, lifted to its due date when that is later (the due date stands
    /// in for completion). Dangling edges to deleted tasks contribute
    /// nothing, and an unknown `task_id` yields `None`.
    ///
    /// The dependency chain is walked iteratively with memoisation, so the
    /// longest chain bounds loop iterations rather than stack depth.
    ///
    /// # Errors
    ///
    /// Returns [`DerivationError::Invariant`] when the walk meets a cycle
    /// (the acyclicity invariant was violated upstream) and
    /// [`DerivationError::Repository`] when reading the graph fails.
    pub async fn earliest_start(
        &self,
        task_id: TaskId,
    ) -> Result<Option<DateTime<Utc>>, DerivationError> {
        let mut memo: HashMap<TaskId, Option<DateTime<Utc>>> = HashMap::new();
        let mut records: HashMap<TaskId, Task> = HashMap::new();
        let mut dependency_lists: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        let mut on_path: HashSet<TaskId> = HashSet::new();
        let mut worklist = vec![Frame::Enter(task_id)];

        while let Some(frame) = worklist.pop() {
            match frame {
                Frame::Enter(id) => {
                    if memo.contains_key(&id) {
                        continue;
                    }
                    if on_path.contains(&id) {
                        error!(task = %id, "cycle encountered while deriving earliest start");
                        return Err(CycleInvariantViolated(id).into());
                    }
                    let Some(task) = self.repository.find_by_id(id).await? else {
                        // Dangling reference: nothing to contribute.
                        memo.insert(id, None);
                        continue;
                    };
                    let dependencies = self.repository.dependency_ids_of(id).await?;
                    on_path.insert(id);
                    worklist.push(Frame::Resolve(id));
                    for dependency in &dependencies {
                        if !memo.contains_key(dependency) {
                            worklist.push(Frame::Enter(*dependency));
                        }
                    }
                    records.insert(id, task);
                    dependency_lists.insert(id, dependencies);
                }
                Frame::Resolve(id) => {
                    on_path.remove(&id);
                    let derived = resolve(id, &records, &dependency_lists, &memo);
                    memo.insert(id, derived);
                }
            }
        }

        Ok(memo.get(&task_id).copied().flatten())
    }
}

/// Combines memoised dependency results into a task's earliest start.
fn resolve(
    id: TaskId,
    records: &HashMap<TaskId, Task>,
    dependency_lists: &HashMap<TaskId, Vec<TaskId>>,
    memo: &HashMap<TaskId, Option<DateTime<Utc>>>,
) -> Option<DateTime<Utc>> {
    let task = records.get(&id)?;
    let dependencies = dependency_lists.get(&id).map_or(&[] as &[TaskId], Vec::as_slice);
    if dependencies.is_empty() {
        return Some(task.created_at());
    }

    let mut latest: Option<DateTime<Utc>> = None;
    for dependency in dependencies {
        let derived = memo.get(dependency).copied().flatten();
        let due = records.get(dependency).and_then(Task::due_at);
        let contribution = match (derived, due) {
            (Some(start), Some(due_at)) => Some(start.max(due_at)),
            (Some(start), None) => Some(start),
            (None, Some(due_at)) => Some(due_at),
            (None, None) => None,
        };
        latest = match (latest, contribution) {
            (Some(current), Some(candidate)) => Some(current.max(candidate)),
            (current, None) => current,
            (None, candidate) => candidate,
        };
    }

    // Every dependency dangling: behave like an independent task.
    latest.or_else(|| Some(task.created_at()))
}
