//! Dependency-aware task scheduling.
//!
//! Tasks may depend on one another; the edge set, kept acyclic at all
//! times, determines each task's earliest possible start date and whether
//! it lies on the critical path. Dependency edits run through the
//! [`services::DependencyEditService`], which validates acyclicity before
//! committing edges and recomputes derived attributes afterwards. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
