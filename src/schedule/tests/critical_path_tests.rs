//! Critical-path marker tests.

use std::sync::Arc;

use super::helpers::{day, insert_task, link};
use crate::schedule::{
    adapters::memory::InMemoryTaskGraphRepository,
    domain::TaskId,
    ports::TaskGraphRepository,
    services::{CriticalPathMarker, DerivationError},
};
use rstest::{fixture, rstest};

#[fixture]
fn repository() -> Arc<InMemoryTaskGraphRepository> {
    Arc::new(InMemoryTaskGraphRepository::new())
}

async fn critical_flags(repository: &InMemoryTaskGraphRepository) -> Vec<TaskId> {
    repository
        .list_tasks()
        .await
        .expect("listing should succeed")
        .into_iter()
        .filter(|task| task.is_critical())
        .map(|task| task.id())
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn marks_backward_chain_from_end_node(repository: Arc<InMemoryTaskGraphRepository>) {
    // A created day 1; B depends on A, due day 5; C depends on B.
    let a = insert_task(&repository, "a", None, day(1)).await;
    let b = insert_task(&repository, "b", Some(day(5)), day(1)).await;
    let c = insert_task(&repository, "c", None, day(1)).await;
    link(&repository, b.id(), a.id()).await;
    link(&repository, c.id(), b.id()).await;

    let marker = CriticalPathMarker::new(Arc::clone(&repository));
    let marked = marker.recompute().await.expect("recompute should succeed");

    assert_eq!(marked, vec![a.id(), b.id(), c.id()]);
    assert_eq!(critical_flags(&repository).await, vec![a.id(), b.id(), c.id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn follows_latest_effective_completion(repository: Arc<InMemoryTaskGraphRepository>) {
    let quick = insert_task(&repository, "quick", Some(day(2)), day(1)).await;
    let slow = insert_task(&repository, "slow", Some(day(8)), day(1)).await;
    let sink = insert_task(&repository, "sink", None, day(1)).await;
    link(&repository, sink.id(), quick.id()).await;
    link(&repository, sink.id(), slow.id()).await;

    let marker = CriticalPathMarker::new(Arc::clone(&repository));
    let marked = marker.recompute().await.expect("recompute should succeed");

    // The bottleneck branch is the slow dependency; the quick one stays off.
    assert_eq!(marked, vec![slow.id(), sink.id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn equal_completion_dates_break_to_lowest_id(repository: Arc<InMemoryTaskGraphRepository>) {
    let first = insert_task(&repository, "first", Some(day(6)), day(1)).await;
    let second = insert_task(&repository, "second", Some(day(6)), day(1)).await;
    let sink = insert_task(&repository, "sink", None, day(1)).await;
    link(&repository, sink.id(), first.id()).await;
    link(&repository, sink.id(), second.id()).await;

    let marker = CriticalPathMarker::new(Arc::clone(&repository));
    let marked = marker.recompute().await.expect("recompute should succeed");

    assert_eq!(marked, vec![first.id(), sink.id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn recompute_is_idempotent(repository: Arc<InMemoryTaskGraphRepository>) {
    let a = insert_task(&repository, "a", None, day(1)).await;
    let b = insert_task(&repository, "b", Some(day(4)), day(1)).await;
    link(&repository, b.id(), a.id()).await;

    let marker = CriticalPathMarker::new(Arc::clone(&repository));
    let first = marker.recompute().await.expect("recompute should succeed");
    let second = marker.recompute().await.expect("recompute should succeed");

    assert_eq!(first, second);
    assert_eq!(critical_flags(&repository).await, first);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_flags_are_cleared_by_the_batch_replacement(
    repository: Arc<InMemoryTaskGraphRepository>,
) {
    let a = insert_task(&repository, "a", None, day(1)).await;
    let b = insert_task(&repository, "b", None, day(1)).await;
    // Mark both, then rewire so only one survives the next recompute.
    repository
        .replace_critical_set(&[a.id(), b.id()])
        .await
        .expect("batch update should succeed");

    let marker = CriticalPathMarker::new(Arc::clone(&repository));
    link(&repository, b.id(), a.id()).await;
    let marked = marker.recompute().await.expect("recompute should succeed");

    assert_eq!(marked, vec![a.id(), b.id()]);
    let solo = insert_task(&repository, "solo", None, day(1)).await;
    repository
        .delete_task(b.id())
        .await
        .expect("deletion should succeed");
    let remarked = marker.recompute().await.expect("recompute should succeed");
    assert_eq!(remarked, vec![a.id(), solo.id()]);
    assert_eq!(critical_flags(&repository).await, vec![a.id(), solo.id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn isolated_tasks_are_their_own_critical_path(
    repository: Arc<InMemoryTaskGraphRepository>,
) {
    let solo = insert_task(&repository, "solo", None, day(1)).await;

    let marker = CriticalPathMarker::new(Arc::clone(&repository));
    let marked = marker.recompute().await.expect("recompute should succeed");

    assert_eq!(marked, vec![solo.id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_graph_clears_everything(repository: Arc<InMemoryTaskGraphRepository>) {
    let marker = CriticalPathMarker::new(Arc::clone(&repository));
    let marked = marker.recompute().await.expect("recompute should succeed");
    assert!(marked.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn corrupted_cycle_fails_loudly(repository: Arc<InMemoryTaskGraphRepository>) {
    let a = insert_task(&repository, "a", None, day(1)).await;
    let b = insert_task(&repository, "b", None, day(1)).await;
    let sink = insert_task(&repository, "sink", None, day(1)).await;
    link(&repository, a.id(), b.id()).await;
    link(&repository, b.id(), a.id()).await;
    link(&repository, sink.id(), a.id()).await;

    let marker = CriticalPathMarker::new(Arc::clone(&repository));
    let result = marker.recompute().await;
    assert!(matches!(result, Err(DerivationError::Invariant(_))));
}
