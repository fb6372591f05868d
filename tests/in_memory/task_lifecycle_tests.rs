//! In-memory integration tests for task lifecycle flows.

use super::helpers::{Engine, engine, staff};
use hireflow::task::{
    domain::{TaskOperation, TaskStatus},
    ports::{AuditStatus, RecordRepository, Severity},
    services::{CreateTaskRequest, TaskLifecycleError},
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_leaves_an_ordered_audit_trail(engine: Engine) -> Result<(), eyre::Report> {
    let task_id = engine.open_task("Schedule induction").await;
    let alice = staff("recAlice");
    let bob = staff("recBob");

    engine.service.claim_task(&task_id, &alice).await?;
    engine.service.unclaim_task(&task_id, &alice).await?;
    engine.service.claim_task(&task_id, &bob).await?;
    engine
        .service
        .flag_task(&task_id, &bob, "room not booked")
        .await?;
    engine
        .service
        .resolve_flag(&task_id, &staff("recMorgan"), "booked room 4")
        .await?;
    let done = engine.service.complete_task(&task_id, &bob).await?;

    eyre::ensure!(done.status() == TaskStatus::Completed);
    eyre::ensure!(done.assignee().is_none());
    eyre::ensure!(done.resolution_note() == "booked room 4");

    let events = engine.audit.events()?;
    let operations: Vec<TaskOperation> = events.iter().map(|event| event.operation).collect();
    eyre::ensure!(
        operations
            == [
                TaskOperation::Create,
                TaskOperation::Claim,
                TaskOperation::Unclaim,
                TaskOperation::Claim,
                TaskOperation::Flag,
                TaskOperation::ResolveFlag,
                TaskOperation::Complete,
            ],
        "unexpected audit trail {operations:?}"
    );
    eyre::ensure!(events.iter().all(|event| event.status == AuditStatus::Success));
    eyre::ensure!(
        events
            .iter()
            .skip(1)
            .all(|event| event.task_id.as_ref() == Some(&task_id))
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn writes_touch_only_their_own_fields(engine: Engine) -> Result<(), eyre::Report> {
    let task_id = engine
        .create(CreateTaskRequest::new("Collect references").with_description("Two referees"))
        .await;
    let record = engine
        .repository
        .find("Tasks", task_id.as_str())
        .await?
        .ok_or_else(|| eyre::eyre!("task record missing"))?;
    let mut fields = record.fields;
    fields.insert("Hiring Manager".to_owned(), json!(["recMorgan"]));
    engine.repository.update("Tasks", task_id.as_str(), fields).await?;

    engine.service.claim_task(&task_id, &staff("recCarol")).await?;

    let stored = engine
        .repository
        .find("Tasks", task_id.as_str())
        .await?
        .ok_or_else(|| eyre::eyre!("task record missing"))?;
    eyre::ensure!(stored.fields.get("Hiring Manager") == Some(&json!(["recMorgan"])));
    eyre::ensure!(stored.fields.get("Description") == Some(&json!("Two referees")));
    eyre::ensure!(stored.fields.get("Assigned To") == Some(&json!(["recCarol"])));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resolve_and_complete_notifies_admins_once(engine: Engine) -> Result<(), eyre::Report> {
    let task_id = engine.open_task("Verify right to work").await;
    engine
        .service
        .flag_task(&task_id, &staff("recAlice"), "visa expired")
        .await?;
    let before = engine.outbox.sent()?.len();

    let done = engine
        .service
        .resolve_and_complete(&task_id, &staff("recBob"), "renewal seen")
        .await?;

    eyre::ensure!(done.status() == TaskStatus::Completed);
    eyre::ensure!(done.flagged_reason().is_empty());
    eyre::ensure!(done.completed_by() == Some(&staff("recBob")));
    let sent = engine.outbox.sent()?;
    eyre::ensure!(sent.len() == before + 1);
    let notice = sent.last().ok_or_else(|| eyre::eyre!("missing notice"))?;
    eyre::ensure!(notice.severity == Severity::Info);
    eyre::ensure!(notice.recipients == vec![staff("recMorgan")]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pre_assigned_task_is_owned_from_creation(engine: Engine) -> Result<(), eyre::Report> {
    let task_id = engine
        .create(
            CreateTaskRequest::new("Issue door badge")
                .with_assignee("recCarol")
                .with_created_by("recMorgan"),
        )
        .await;

    let task = engine.service.find_task(&task_id).await?;
    eyre::ensure!(task.assignee() == Some(&staff("recCarol")));
    eyre::ensure!(task.claimed_at().is_some());

    let steal = engine.service.claim_task(&task_id, &staff("recAlice")).await;
    eyre::ensure!(
        matches!(steal, Err(TaskLifecycleError::Conflict(_))),
        "claiming an owned task should conflict, got {steal:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_operations_are_audited_but_validation_is_not(
    engine: Engine,
) -> Result<(), eyre::Report> {
    let task_id = engine.open_task("Return equipment").await;
    let bob = staff("recBob");

    let blank = engine.service.flag_task(&task_id, &bob, "").await;
    eyre::ensure!(matches!(blank, Err(TaskLifecycleError::Validation { .. })));
    let unflagged = engine.service.resolve_flag(&task_id, &bob, "nothing").await;
    eyre::ensure!(matches!(unflagged, Err(TaskLifecycleError::Conflict(_))));

    let events = engine.audit.events()?;
    eyre::ensure!(events.len() == 2, "expected create and one failure");
    let failure = events.last().ok_or_else(|| eyre::eyre!("missing event"))?;
    eyre::ensure!(failure.operation == TaskOperation::ResolveFlag);
    eyre::ensure!(failure.status == AuditStatus::Error);
    eyre::ensure!(failure.message.contains("Task is not flagged"));
    Ok(())
}
