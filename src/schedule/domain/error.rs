//! Error types for schedule domain validation and invariant checks.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing domain schedule values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// A task was listed as its own dependency.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),
}

/// A derivation walked into a dependency cycle.
///
/// The edge set is required to stay acyclic, so meeting a cycle while
/// deriving earliest starts or the critical path means the invariant was
/// violated upstream (corrupted storage or an edge committed without a cycle
/// check). This is a programming failure, not a user error; callers surface
/// it distinctly instead of persisting a wrong date.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("dependency cycle encountered at task {0} during schedule derivation")]
pub struct CycleInvariantViolated(pub TaskId);
