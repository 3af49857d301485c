//! Cycle detection for proposed dependency edges.

use crate::schedule::{
    domain::TaskId,
    ports::{GraphRepositoryResult, TaskGraphRepository},
};
use std::collections::HashSet;
use std::sync::Arc;

/// Worklist frame: enter a node, or leave it after its subtree is explored.
enum Frame {
    Enter(TaskId),
    Leave(TaskId),
}

/// Read-only detector deciding whether a proposed edge would close a cycle.
#[derive(Clone)]
pub struct CycleDetector<R>
where
    R: TaskGraphRepository,
{
    repository: Arc<R>,
}

impl<R> CycleDetector<R>
where
    R: TaskGraphRepository,
{
    /// Creates a detector reading through the given repository.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Reports whether adding "`dependent` depends on `candidate`" would
    /// close a cycle.
    ///
    /// The search starts at `candidate` and follows its dependencies
    /// transitively with an explicit worklist. It returns `true` when
    /// `dependent` is reached (the proposed edge would close the loop), and
    /// also when a node already on the active search path reappears, which
    /// signals a cycle already present in stored data. The visited set
    /// bounds the traversal, so the search terminates even on such corrupted
    /// graphs.
    ///
    /// Unknown identifiers have no dependencies to traverse and contribute
    /// no cycle; the orchestrator validates existence separately. Equal
    /// identifiers (self-dependency) are rejected by the orchestrator before
    /// this check runs.
    ///
    /// # Errors
    ///
    /// Returns a repository error when reading edges fails.
    pub async fn would_create_cycle(
        &self,
        dependent: TaskId,
        candidate: TaskId,
    ) -> GraphRepositoryResult<bool> {
        let mut visited: HashSet<TaskId> = HashSet::new();
        let mut on_path: HashSet<TaskId> = HashSet::new();
        let mut worklist = vec![Frame::Enter(candidate)];

        while let Some(frame) = worklist.pop() {
            match frame {
                Frame::Enter(id) => {
                    if id == dependent {
                        return Ok(true);
                    }
                    if on_path.contains(&id) {
                        // Pre-existing cycle on the current path.
                        return Ok(true);
                    }
                    if !visited.insert(id) {
                        continue;
                    }
                    on_path.insert(id);
                    worklist.push(Frame::Leave(id));
                    for dependency in self.repository.dependency_ids_of(id).await? {
                        if !visited.contains(&dependency) || on_path.contains(&dependency) {
                            worklist.push(Frame::Enter(dependency));
                        }
                    }
                }
                Frame::Leave(id) => {
                    on_path.remove(&id);
                }
            }
        }

        Ok(false)
    }
}
