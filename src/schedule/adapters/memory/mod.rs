//! In-memory adapters for schedule persistence.

mod repository;

pub use repository::InMemoryTaskGraphRepository;
