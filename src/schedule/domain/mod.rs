//! Domain model for dependency-aware task scheduling.
//!
//! The schedule domain models tasks, directed dependency edges between
//! them, and the derived attributes (earliest start, critical-path flag)
//! recomputed from the graph, while keeping all infrastructure concerns
//! outside of the domain boundary.

mod edge;
mod error;
mod ids;
mod task;

pub use edge::DependencyEdge;
pub use error::{CycleInvariantViolated, ScheduleDomainError};
pub use ids::{TaskId, TaskTitle};
pub use task::{NewTask, PersistedTaskData, Task};
