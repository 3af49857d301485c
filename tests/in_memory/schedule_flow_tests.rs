//! End-to-end scheduling flows over the in-memory adapter.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use gantt::schedule::{
    adapters::memory::InMemoryTaskGraphRepository,
    domain::{Task, TaskId},
    ports::TaskGraphRepository,
    services::{
        CreateTaskRequest, DependencyEditError, DependencyEditRequest, DependencyEditService,
        DerivedFreshness, TaskLifecycleService,
    },
};
use mockable::Clock;
use rstest::{fixture, rstest};

/// Clock pinned to a single instant, for deterministic creation stamps.
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, n, 0, 0, 0)
        .single()
        .expect("valid test date")
}

struct Harness {
    repository: Arc<InMemoryTaskGraphRepository>,
    edits: DependencyEditService<InMemoryTaskGraphRepository>,
}

impl Harness {
    async fn create(&self, title: &str, due_at: Option<DateTime<Utc>>, created: DateTime<Utc>) -> Task {
        let lifecycle =
            TaskLifecycleService::new(Arc::clone(&self.repository), Arc::new(FixedClock(created)));
        let mut request = CreateTaskRequest::new(title);
        if let Some(due) = due_at {
            request = request.with_due_date(due);
        }
        lifecycle
            .create_task(request)
            .await
            .expect("task creation should succeed")
    }

    async fn add(&self, task: TaskId, dependencies: &[TaskId]) -> DerivedFreshness {
        self.edits
            .add_dependencies(&DependencyEditRequest::new(task, dependencies.to_vec()))
            .await
            .expect("dependency edit should succeed")
            .freshness()
    }

    async fn stored(&self, id: TaskId) -> Task {
        self.repository
            .find_by_id(id)
            .await
            .expect("lookup should succeed")
            .expect("task exists")
    }
}

#[fixture]
fn harness() -> Harness {
    let repository = Arc::new(InMemoryTaskGraphRepository::new());
    Harness {
        edits: DependencyEditService::new(Arc::clone(&repository)),
        repository,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn chain_scenario_derives_starts_and_critical_path(harness: Harness) {
    // A created day 1, no due date; B depends on A, due day 5; C depends on B.
    let a = harness.create("a", None, day(1)).await;
    let b = harness.create("b", Some(day(5)), day(1)).await;
    let c = harness.create("c", None, day(1)).await;

    assert_eq!(harness.add(b.id(), &[a.id()]).await, DerivedFreshness::Fresh);
    assert_eq!(harness.add(c.id(), &[b.id()]).await, DerivedFreshness::Fresh);

    let stored_b = harness.stored(b.id()).await;
    let stored_c = harness.stored(c.id()).await;
    assert_eq!(stored_b.earliest_start(), Some(day(1)));
    assert_eq!(stored_c.earliest_start(), Some(day(5)));

    // The backward walk from end node C marks C, then B, then A.
    for id in [a.id(), b.id(), c.id()] {
        assert!(harness.stored(id).await.is_critical());
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transitive_cycle_is_rejected_end_to_end(harness: Harness) {
    let a = harness.create("a", None, day(1)).await;
    let b = harness.create("b", None, day(1)).await;
    let c = harness.create("c", None, day(1)).await;
    harness.add(b.id(), &[a.id()]).await;
    harness.add(c.id(), &[b.id()]).await;

    let result = harness
        .edits
        .add_dependencies(&DependencyEditRequest::new(a.id(), vec![c.id()]))
        .await;

    assert!(matches!(
        result,
        Err(DependencyEditError::CycleDetected { dependency }) if dependency == c.id()
    ));
    // Nothing was committed: A still has no dependencies.
    let dependencies = harness
        .repository
        .dependency_ids_of(a.id())
        .await
        .expect("lookup should succeed");
    assert!(dependencies.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn branching_graph_follows_the_bottleneck(harness: Harness) {
    // Two chains feed one sink; the one finishing later is critical.
    let fast = harness.create("fast", Some(day(2)), day(1)).await;
    let slow = harness.create("slow", Some(day(9)), day(1)).await;
    let merge = harness.create("merge", None, day(1)).await;
    harness.add(merge.id(), &[fast.id(), slow.id()]).await;

    assert!(harness.stored(slow.id()).await.is_critical());
    assert!(harness.stored(merge.id()).await.is_critical());
    assert!(!harness.stored(fast.id()).await.is_critical());
    assert_eq!(harness.stored(merge.id()).await.earliest_start(), Some(day(9)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removing_an_edge_restores_independence(harness: Harness) {
    let a = harness.create("a", Some(day(5)), day(1)).await;
    let b = harness.create("b", None, day(2)).await;
    harness.add(b.id(), &[a.id()]).await;
    assert_eq!(harness.stored(b.id()).await.earliest_start(), Some(day(5)));

    harness
        .edits
        .remove_dependencies(&DependencyEditRequest::new(b.id(), vec![a.id()]))
        .await
        .expect("removal should succeed");

    assert_eq!(harness.stored(b.id()).await.earliest_start(), Some(day(2)));
    // Both tasks are ends of their own paths again.
    assert!(harness.stored(a.id()).await.is_critical());
    assert!(harness.stored(b.id()).await.is_critical());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_recompute_is_stable(harness: Harness) {
    let a = harness.create("a", None, day(1)).await;
    let b = harness.create("b", Some(day(3)), day(1)).await;
    harness.add(b.id(), &[a.id()]).await;

    let before: Vec<bool> = collect_flags(&harness).await;
    // An idempotent no-op edit re-runs the whole recompute sequence.
    harness.add(b.id(), &[a.id()]).await;
    let after: Vec<bool> = collect_flags(&harness).await;

    assert_eq!(before, after);
}

async fn collect_flags(harness: &Harness) -> Vec<bool> {
    harness
        .repository
        .list_tasks()
        .await
        .expect("listing should succeed")
        .iter()
        .map(Task::is_critical)
        .collect()
}
