//! Then steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use hireflow::task::{
    domain::{StaffId, StatusBucket},
    services::TaskLifecycleError,
};
use rstest_bdd_macros::then;

#[then(r#"the last operation fails with conflict "{message}""#)]
fn last_operation_conflicts(world: &TaskLifecycleWorld, message: String) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing operation result"))?;
    let Err(err @ TaskLifecycleError::Conflict(_)) = result else {
        return Err(eyre::eyre!("expected a conflict, got {result:?}"));
    };
    eyre::ensure!(
        err.public_message() == message,
        "expected {message:?}, got {:?}",
        err.public_message()
    );
    Ok(())
}

#[then(r#"the task is assigned to "{actor}""#)]
fn task_is_assigned_to(world: &TaskLifecycleWorld, actor: String) -> Result<(), eyre::Report> {
    let task = run_async(world.service.find_task(world.task_id()?))?;
    let expected = StaffId::new(actor)?;
    eyre::ensure!(
        task.assignee() == Some(&expected),
        "expected assignee {expected}, found {:?}",
        task.assignee()
    );
    Ok(())
}

#[then(r#"the task is listed for "{actor}" in the "{bucket}" bucket"#)]
fn task_listed_in_bucket(
    world: &TaskLifecycleWorld,
    actor: String,
    bucket: String,
) -> Result<(), eyre::Report> {
    let expected = match bucket.as_str() {
        "upcoming" => StatusBucket::Upcoming,
        "overdue" => StatusBucket::Overdue,
        "flagged" => StatusBucket::Flagged,
        other => return Err(eyre::eyre!("unknown bucket {other:?} in scenario")),
    };
    let staff = StaffId::new(actor)?;
    let buckets = run_async(world.service.list_tasks_for_actor(&staff, None, None))?;
    let task = run_async(world.service.find_task(world.task_id()?))?;
    eyre::ensure!(
        buckets.bucket_of(&task) == Some(expected),
        "expected {expected:?}, found {:?}",
        buckets.bucket_of(&task)
    );
    Ok(())
}

#[then(r#"the task is listed for "{actor}" in no bucket"#)]
fn task_listed_nowhere(world: &TaskLifecycleWorld, actor: String) -> Result<(), eyre::Report> {
    let staff = StaffId::new(actor)?;
    let buckets = run_async(world.service.list_tasks_for_actor(&staff, None, None))?;
    let task = run_async(world.service.find_task(world.task_id()?))?;
    eyre::ensure!(
        buckets.bucket_of(&task).is_none(),
        "task still listed in {:?}",
        buckets.bucket_of(&task)
    );
    Ok(())
}

#[then(r#"the task was completed by "{actor}""#)]
fn task_completed_by(world: &TaskLifecycleWorld, actor: String) -> Result<(), eyre::Report> {
    let task = run_async(world.service.find_task(world.task_id()?))?;
    let expected = StaffId::new(actor)?;
    eyre::ensure!(task.completed_by() == Some(&expected));
    eyre::ensure!(task.assignee().is_none());
    Ok(())
}
