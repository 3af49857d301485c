//! Shared fixtures for schedule unit tests.

use crate::schedule::{
    adapters::memory::InMemoryTaskGraphRepository,
    domain::{DependencyEdge, NewTask, Task, TaskId},
    ports::TaskGraphRepository,
};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock pinned to a single instant, for deterministic creation stamps.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Midnight UTC on the given day of January 2026.
pub fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, n, 0, 0, 0)
        .single()
        .expect("valid test date")
}

/// Inserts a task with a pinned creation date and optional due date.
pub async fn insert_task(
    repository: &InMemoryTaskGraphRepository,
    title: &str,
    due_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
) -> Task {
    let new_task =
        NewTask::new(title, due_at, &FixedClock(created_at)).expect("valid task title");
    repository
        .insert_task(&new_task)
        .await
        .expect("task insertion should succeed")
}

/// Seeds a raw edge, bypassing orchestrator validation.
pub async fn link(
    repository: &InMemoryTaskGraphRepository,
    dependent: TaskId,
    dependency: TaskId,
) {
    let edge = DependencyEdge::new(dependent, dependency).expect("distinct task ids");
    repository
        .add_edge(edge)
        .await
        .expect("edge insertion should succeed");
}
