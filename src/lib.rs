//! Gantt: dependency-aware todo scheduling.
//!
//! This crate tracks tasks that may depend on one another and derives two
//! properties from the dependency graph: each task's earliest possible
//! start date and whether it lies on the critical path. Dependency edits
//! keep the graph acyclic; derived attributes are recomputed from the full
//! edge set after every edit, never patched incrementally.
//!
//! # Architecture
//!
//! Gantt follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`schedule`]: Task graph, dependency edits, and schedule derivation

pub mod schedule;
