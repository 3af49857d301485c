//! Port contracts for schedule persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by the scheduling
//! services.

pub mod repository;

pub use repository::{
    GraphRepositoryError, GraphRepositoryResult, TaskGraphRepository, TaskWithEdges,
};
