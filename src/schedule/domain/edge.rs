//! Directed dependency edges between tasks.

use super::{ScheduleDomainError, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered dependency pair: the dependent cannot start before the dependency
/// finishes.
///
/// Self-loops are rejected at construction; acyclicity of the whole edge set
/// is enforced by the dependency edit orchestrator before edges are
/// committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    dependent: TaskId,
    dependency: TaskId,
}

impl DependencyEdge {
    /// Creates an edge meaning `dependent` depends on `dependency`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::SelfDependency`] when both identifiers
    /// are equal.
    pub fn new(dependent: TaskId, dependency: TaskId) -> Result<Self, ScheduleDomainError> {
        if dependent == dependency {
            return Err(ScheduleDomainError::SelfDependency(dependent));
        }
        Ok(Self {
            dependent,
            dependency,
        })
    }

    /// Returns the task that waits on the dependency.
    #[must_use]
    pub const fn dependent(self) -> TaskId {
        self.dependent
    }

    /// Returns the task that must finish first.
    #[must_use]
    pub const fn dependency(self) -> TaskId {
        self.dependency
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.dependent, self.dependency)
    }
}
