//! Application services for schedule derivation and task lifecycle.
//!
//! The derivation components ([`CycleDetector`], [`EarliestStartCalculator`],
//! [`CriticalPathMarker`]) hold the graph logic; [`DependencyEditService`]
//! composes them around edge mutations and [`TaskLifecycleService`] covers
//! plain task CRUD.

mod critical_path;
mod cycle;
mod dependency_edit;
mod earliest_start;
mod lifecycle;

pub use critical_path::CriticalPathMarker;
pub use cycle::CycleDetector;
pub use dependency_edit::{
    DependencyEditError, DependencyEditOutcome, DependencyEditRequest, DependencyEditService,
    DerivedFreshness,
};
pub use earliest_start::EarliestStartCalculator;
pub use lifecycle::{
    CreateTaskRequest, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
};

use crate::schedule::domain::CycleInvariantViolated;
use crate::schedule::ports::GraphRepositoryError;
use thiserror::Error;

/// Errors raised while deriving earliest starts or the critical path.
#[derive(Debug, Clone, Error)]
pub enum DerivationError {
    /// The derivation met a cycle the acyclicity invariant forbids.
    #[error(transparent)]
    Invariant(#[from] CycleInvariantViolated),

    /// Reading or writing the graph failed.
    #[error(transparent)]
    Repository(#[from] GraphRepositoryError),
}
