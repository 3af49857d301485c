//! Diesel row models for task graph persistence.

use super::schema::{task_dependencies, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Storage-assigned task identifier.
    pub id: i64,
    /// Task title.
    pub title: String,
    /// Optional due date.
    pub due_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Derived earliest-start date.
    pub earliest_start: Option<DateTime<Utc>>,
    /// Derived critical-path flag.
    pub is_critical: bool,
}

/// Insert model for task records; the identifier comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task title.
    pub title: String,
    /// Optional due date.
    pub due_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Derived earliest-start date, unset at creation.
    pub earliest_start: Option<DateTime<Utc>>,
    /// Derived critical-path flag, unset at creation.
    pub is_critical: bool,
}

/// Row model for dependency edges, used for both queries and inserts.
#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_dependencies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DependencyEdgeRow {
    /// The task that waits.
    pub dependent_id: i64,
    /// The task that must finish first.
    pub dependency_id: i64,
}
