//! In-memory graph repository for tests and embedded use.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use crate::schedule::{
    domain::{DependencyEdge, NewTask, PersistedTaskData, Task, TaskId},
    ports::{GraphRepositoryError, GraphRepositoryResult, TaskGraphRepository, TaskWithEdges},
};

/// Thread-safe in-memory task graph repository.
///
/// Tasks and edges live in ordered maps, so enumeration and edge expansion
/// come back in ascending identifier order without extra sorting.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskGraphRepository {
    state: Arc<RwLock<GraphState>>,
}

#[derive(Debug, Default)]
struct GraphState {
    tasks: BTreeMap<TaskId, Task>,
    edges: BTreeSet<(TaskId, TaskId)>,
    next_id: i64,
}

impl InMemoryTaskGraphRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> GraphRepositoryResult<std::sync::RwLockReadGuard<'_, GraphState>> {
        self.state.read().map_err(|err| {
            GraphRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(&self) -> GraphRepositoryResult<std::sync::RwLockWriteGuard<'_, GraphState>> {
        self.state.write().map_err(|err| {
            GraphRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Direct dependency identifiers of `id`, ascending.
fn dependencies_in(state: &GraphState, id: TaskId) -> Vec<TaskId> {
    state
        .edges
        .iter()
        .filter(|(dependent, _)| *dependent == id)
        .map(|(_, dependency)| *dependency)
        .collect()
}

/// Direct dependent identifiers of `id`, ascending.
fn dependents_in(state: &GraphState, id: TaskId) -> Vec<TaskId> {
    let mut dependents: Vec<TaskId> = state
        .edges
        .iter()
        .filter(|(_, dependency)| *dependency == id)
        .map(|(dependent, _)| *dependent)
        .collect();
    dependents.sort_unstable();
    dependents
}

#[async_trait]
impl TaskGraphRepository for InMemoryTaskGraphRepository {
    async fn insert_task(&self, new_task: &NewTask) -> GraphRepositoryResult<Task> {
        let mut state = self.write_state()?;
        state.next_id += 1;
        let id = TaskId::new(state.next_id);
        let task = Task::from_persisted(PersistedTaskData {
            id,
            title: new_task.title().clone(),
            due_at: new_task.due_at(),
            created_at: new_task.created_at(),
            earliest_start: None,
            is_critical: false,
        });
        state.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: TaskId) -> GraphRepositoryResult<Option<Task>> {
        let state = self.read_state()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_with_edges(&self, id: TaskId) -> GraphRepositoryResult<Option<TaskWithEdges>> {
        let state = self.read_state()?;
        Ok(state.tasks.get(&id).cloned().map(|task| TaskWithEdges {
            dependencies: dependencies_in(&state, id),
            dependents: dependents_in(&state, id),
            task,
        }))
    }

    async fn list_tasks(&self) -> GraphRepositoryResult<Vec<Task>> {
        let state = self.read_state()?;
        Ok(state.tasks.values().cloned().collect())
    }

    async fn list_edges(&self) -> GraphRepositoryResult<Vec<DependencyEdge>> {
        let state = self.read_state()?;
        let mut edges = Vec::with_capacity(state.edges.len());
        for (dependent, dependency) in &state.edges {
            let edge = DependencyEdge::new(*dependent, *dependency)
                .map_err(GraphRepositoryError::persistence)?;
            edges.push(edge);
        }
        Ok(edges)
    }

    async fn dependency_ids_of(&self, id: TaskId) -> GraphRepositoryResult<Vec<TaskId>> {
        let state = self.read_state()?;
        Ok(dependencies_in(&state, id))
    }

    async fn add_edge(&self, edge: DependencyEdge) -> GraphRepositoryResult<()> {
        let mut state = self.write_state()?;
        state.edges.insert((edge.dependent(), edge.dependency()));
        Ok(())
    }

    async fn remove_edge(&self, edge: DependencyEdge) -> GraphRepositoryResult<()> {
        let mut state = self.write_state()?;
        state.edges.remove(&(edge.dependent(), edge.dependency()));
        Ok(())
    }

    async fn update_earliest_start(
        &self,
        id: TaskId,
        earliest_start: Option<DateTime<Utc>>,
    ) -> GraphRepositoryResult<()> {
        let mut state = self.write_state()?;
        let task = state
            .tasks
            .get(&id)
            .ok_or(GraphRepositoryError::NotFound(id))?;
        let mut data = to_persisted(task);
        data.earliest_start = earliest_start;
        state.tasks.insert(id, Task::from_persisted(data));
        Ok(())
    }

    async fn replace_critical_set(&self, critical: &[TaskId]) -> GraphRepositoryResult<()> {
        let marked: BTreeSet<TaskId> = critical.iter().copied().collect();
        let mut state = self.write_state()?;
        let updated: Vec<(TaskId, Task)> = state
            .tasks
            .iter()
            .map(|(id, task)| {
                let mut data = to_persisted(task);
                data.is_critical = marked.contains(id);
                (*id, Task::from_persisted(data))
            })
            .collect();
        state.tasks.extend(updated);
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> GraphRepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.tasks.remove(&id).is_none() {
            return Err(GraphRepositoryError::NotFound(id));
        }
        state
            .edges
            .retain(|(dependent, dependency)| *dependent != id && *dependency != id);
        Ok(())
    }
}

/// Rebuilds the persistence view of a stored task for field updates.
fn to_persisted(task: &Task) -> PersistedTaskData {
    PersistedTaskData {
        id: task.id(),
        title: task.title().clone(),
        due_at: task.due_at(),
        created_at: task.created_at(),
        earliest_start: task.earliest_start(),
        is_critical: task.is_critical(),
    }
}
