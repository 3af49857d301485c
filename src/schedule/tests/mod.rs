//! Unit tests for the schedule context.

mod critical_path_tests;
mod helpers;
