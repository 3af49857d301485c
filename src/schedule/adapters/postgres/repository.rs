//! `PostgreSQL` repository implementation for the task graph store.

use super::{
    models::{DependencyEdgeRow, NewTaskRow, TaskRow},
    schema::{task_dependencies, tasks},
};
use crate::schedule::{
    domain::{DependencyEdge, NewTask, PersistedTaskData, Task, TaskId, TaskTitle},
    ports::{GraphRepositoryError, GraphRepositoryResult, TaskGraphRepository, TaskWithEdges},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;

/// `PostgreSQL` connection pool type used by schedule adapters.
pub type SchedulePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task graph repository.
///
/// Multi-statement mutations (cascade delete, batch flag replacement) run
/// inside a transaction, so concurrent readers never observe a partially
/// updated graph.
#[derive(Debug, Clone)]
pub struct PostgresTaskGraphRepository {
    pool: SchedulePgPool,
}

impl PostgresTaskGraphRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: SchedulePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> GraphRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> GraphRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(GraphRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(GraphRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskGraphRepository for PostgresTaskGraphRepository {
    async fn insert_task(&self, new_task: &NewTask) -> GraphRepositoryResult<Task> {
        let new_row = NewTaskRow {
            title: new_task.title().as_str().to_owned(),
            due_at: new_task.due_at(),
            created_at: new_task.created_at(),
            earliest_start: None,
            is_critical: false,
        };
        self.run_blocking(move |connection| {
            let row = diesel::insert_into(tasks::table)
                .values(&new_row)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .map_err(GraphRepositoryError::persistence)?;
            row_to_task(row)
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> GraphRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.value())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(GraphRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_with_edges(&self, id: TaskId) -> GraphRepositoryResult<Option<TaskWithEdges>> {
        self.run_blocking(move |connection| {
            let maybe_row = tasks::table
                .find(id.value())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(GraphRepositoryError::persistence)?;
            let Some(row) = maybe_row else {
                return Ok(None);
            };
            let dependencies = dependency_ids(connection, id)?;
            let dependents = task_dependencies::table
                .filter(task_dependencies::dependency_id.eq(id.value()))
                .select(task_dependencies::dependent_id)
                .order(task_dependencies::dependent_id.asc())
                .load::<i64>(connection)
                .map_err(GraphRepositoryError::persistence)?
                .into_iter()
                .map(TaskId::new)
                .collect();
            Ok(Some(TaskWithEdges {
                task: row_to_task(row)?,
                dependencies,
                dependents,
            }))
        })
        .await
    }

    async fn list_tasks(&self) -> GraphRepositoryResult<Vec<Task>> {
        self.run_blocking(|connection| {
            let rows = tasks::table
                .order(tasks::id.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(GraphRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_edges(&self) -> GraphRepositoryResult<Vec<DependencyEdge>> {
        self.run_blocking(|connection| {
            let rows = task_dependencies::table
                .select(DependencyEdgeRow::as_select())
                .load::<DependencyEdgeRow>(connection)
                .map_err(GraphRepositoryError::persistence)?;
            rows.into_iter()
                .map(|row| {
                    DependencyEdge::new(TaskId::new(row.dependent_id), TaskId::new(row.dependency_id))
                        .map_err(GraphRepositoryError::persistence)
                })
                .collect()
        })
        .await
    }

    async fn dependency_ids_of(&self, id: TaskId) -> GraphRepositoryResult<Vec<TaskId>> {
        self.run_blocking(move |connection| dependency_ids(connection, id))
            .await
    }

    async fn add_edge(&self, edge: DependencyEdge) -> GraphRepositoryResult<()> {
        let row = DependencyEdgeRow {
            dependent_id: edge.dependent().value(),
            dependency_id: edge.dependency().value(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(task_dependencies::table)
                .values(&row)
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(GraphRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn remove_edge(&self, edge: DependencyEdge) -> GraphRepositoryResult<()> {
        let dependent = edge.dependent().value();
        let dependency = edge.dependency().value();
        self.run_blocking(move |connection| {
            diesel::delete(
                task_dependencies::table
                    .filter(task_dependencies::dependent_id.eq(dependent))
                    .filter(task_dependencies::dependency_id.eq(dependency)),
            )
            .execute(connection)
            .map_err(GraphRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn update_earliest_start(
        &self,
        id: TaskId,
        earliest_start: Option<DateTime<Utc>>,
    ) -> GraphRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::update(tasks::table.find(id.value()))
                .set(tasks::earliest_start.eq(earliest_start))
                .execute(connection)
                .map_err(GraphRepositoryError::persistence)?;
            if affected == 0 {
                return Err(GraphRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn replace_critical_set(&self, critical: &[TaskId]) -> GraphRepositoryResult<()> {
        let marked: Vec<i64> = critical.iter().map(|id| id.value()).collect();
        self.run_blocking(move |connection| {
            connection
                .transaction::<(), DieselError, _>(|transaction| {
                    diesel::update(tasks::table)
                        .set(tasks::is_critical.eq(false))
                        .execute(transaction)?;
                    if !marked.is_empty() {
                        diesel::update(tasks::table.filter(tasks::id.eq_any(&marked)))
                            .set(tasks::is_critical.eq(true))
                            .execute(transaction)?;
                    }
                    Ok(())
                })
                .map_err(GraphRepositoryError::persistence)
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> GraphRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = connection
                .transaction::<usize, DieselError, _>(|transaction| {
                    diesel::delete(
                        task_dependencies::table.filter(
                            task_dependencies::dependent_id
                                .eq(id.value())
                                .or(task_dependencies::dependency_id.eq(id.value())),
                        ),
                    )
                    .execute(transaction)?;
                    diesel::delete(tasks::table.find(id.value())).execute(transaction)
                })
                .map_err(GraphRepositoryError::persistence)?;
            if affected == 0 {
                return Err(GraphRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn dependency_ids(connection: &mut PgConnection, id: TaskId) -> GraphRepositoryResult<Vec<TaskId>> {
    let raw = task_dependencies::table
        .filter(task_dependencies::dependent_id.eq(id.value()))
        .select(task_dependencies::dependency_id)
        .order(task_dependencies::dependency_id.asc())
        .load::<i64>(connection)
        .map_err(GraphRepositoryError::persistence)?;
    Ok(raw.into_iter().map(TaskId::new).collect())
}

fn row_to_task(row: TaskRow) -> GraphRepositoryResult<Task> {
    let TaskRow {
        id,
        title,
        due_at,
        created_at,
        earliest_start,
        is_critical,
    } = row;
    let validated_title = TaskTitle::new(title).map_err(GraphRepositoryError::persistence)?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::new(id),
        title: validated_title,
        due_at,
        created_at,
        earliest_start,
        is_critical,
    }))
}
