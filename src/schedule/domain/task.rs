//! Task aggregate root and construction types.

use super::{ScheduleDomainError, TaskId, TaskTitle};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task aggregate root.
///
/// `earliest_start` and `is_critical` are derived attributes owned by the
/// graph store and recomputed by the scheduling services whenever the edge
/// set changes; they are never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    due_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    earliest_start: Option<DateTime<Utc>>,
    is_critical: bool,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted due date, if any.
    pub due_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted derived earliest start, if derived yet.
    pub earliest_start: Option<DateTime<Utc>>,
    /// Persisted critical-path flag.
    pub is_critical: bool,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            due_at: data.due_at,
            created_at: data.created_at,
            earliest_start: data.earliest_start,
            is_critical: data.is_critical,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the due date, if set.
    #[must_use]
    pub const fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the derived earliest start, if derived.
    #[must_use]
    pub const fn earliest_start(&self) -> Option<DateTime<Utc>> {
        self.earliest_start
    }

    /// Returns whether the task lies on the critical path.
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        self.is_critical
    }

    /// Returns the date this task is expected to be finished by: the due
    /// date when set, otherwise the creation timestamp.
    ///
    /// Dependents can start no earlier than this instant, and the critical
    /// path follows the dependency with the latest such date at each step.
    #[must_use]
    pub fn effective_completion(&self) -> DateTime<Utc> {
        self.due_at.unwrap_or(self.created_at)
    }
}

/// A task not yet stored; the graph store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: TaskTitle,
    due_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl NewTask {
    /// Creates a new independent task stamped with the current clock time.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::EmptyTitle`] when the title is empty
    /// after trimming.
    pub fn new(
        title: impl Into<String>,
        due_at: Option<DateTime<Utc>>,
        clock: &impl Clock,
    ) -> Result<Self, ScheduleDomainError> {
        Ok(Self {
            title: TaskTitle::new(title)?,
            due_at,
            created_at: clock.utc(),
        })
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the due date, if set.
    #[must_use]
    pub const fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
