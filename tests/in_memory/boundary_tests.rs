//! JSON boundary parsing feeding the dependency edit orchestrator.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use gantt::schedule::{
    adapters::memory::InMemoryTaskGraphRepository,
    domain::TaskId,
    services::{
        CreateTaskRequest, DependencyEditError, DependencyEditRequest, DependencyEditService,
        TaskLifecycleService,
    },
};
use mockable::Clock;
use rstest::{fixture, rstest};
use serde_json::json;

struct NowClock;

impl Clock for NowClock {
    fn local(&self) -> DateTime<Local> {
        Local::now()
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[fixture]
fn repository() -> Arc<InMemoryTaskGraphRepository> {
    Arc::new(InMemoryTaskGraphRepository::new())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn parsed_payload_drives_an_edit(repository: Arc<InMemoryTaskGraphRepository>) {
    let lifecycle = TaskLifecycleService::new(Arc::clone(&repository), Arc::new(NowClock));
    let task = lifecycle
        .create_task(CreateTaskRequest::new("dependent"))
        .await
        .expect("creation should succeed");
    let dependency = lifecycle
        .create_task(CreateTaskRequest::new("dependency"))
        .await
        .expect("creation should succeed");

    let payload = json!([dependency.id().value()]);
    let request =
        DependencyEditRequest::from_json(task.id(), &payload).expect("well-formed payload");

    let service = DependencyEditService::new(Arc::clone(&repository));
    let outcome = service
        .add_dependencies(&request)
        .await
        .expect("edit should succeed");
    assert_eq!(outcome.task().id(), task.id());
}

#[rstest]
fn malformed_payloads_are_rejected_before_any_lookup() {
    for payload in [json!({"ids": [1]}), json!("1"), json!([1, true])] {
        let result = DependencyEditRequest::from_json(TaskId::new(1), &payload);
        assert!(matches!(
            result,
            Err(DependencyEditError::InvalidInput(_))
        ));
    }
}
