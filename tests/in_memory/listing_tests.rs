//! Dashboard listing integration tests.

use super::helpers::{Engine, engine, staff};
use chrono::TimeDelta;
use hireflow::task::{
    domain::{StatusBucket, Task, TaskId},
    ports::{PageCursor, RecordRepository},
    services::{CreateTaskRequest, TaskListCache},
};
use rstest::rstest;
use serde_json::json;
use std::collections::HashSet;
use std::time::Duration;

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.id().as_str()).collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn actor_sees_own_and_unassigned_tasks_in_buckets(
    engine: Engine,
) -> Result<(), eyre::Report> {
    let alice = staff("recAlice");
    let late = engine
        .create(
            CreateTaskRequest::new("Sign NDA")
                .with_due_date("2026-03-01")
                .with_assignee("recAlice"),
        )
        .await;
    let today = engine
        .create(CreateTaskRequest::new("Meet buddy").with_due_date("2026-03-10"))
        .await;
    let undated = engine
        .create(CreateTaskRequest::new("Read handbook").with_urgency("Very High"))
        .await;
    let flagged = engine.open_task("Upload photo").await;
    engine
        .service
        .flag_task(&flagged, &alice, "photo rejected")
        .await?;
    let bobs = engine
        .create(CreateTaskRequest::new("Bob's laptop").with_assignee("recBob"))
        .await;
    let done = engine.open_task("Accept offer").await;
    engine.service.complete_task(&done, &alice).await?;

    let buckets = engine
        .service
        .list_tasks_for_actor(&alice, None, None)
        .await?;

    eyre::ensure!(ids(&buckets.overdue) == [late.as_str()]);
    eyre::ensure!(
        ids(&buckets.upcoming) == [undated.as_str(), today.as_str()],
        "very high urgency sorts first, got {:?}",
        ids(&buckets.upcoming)
    );
    eyre::ensure!(ids(&buckets.flagged) == [flagged.as_str()]);
    let listed: HashSet<&str> = ids(&buckets.upcoming)
        .into_iter()
        .chain(ids(&buckets.overdue))
        .chain(ids(&buckets.flagged))
        .collect();
    eyre::ensure!(!listed.contains(bobs.as_str()));
    eyre::ensure!(!listed.contains(done.as_str()));
    eyre::ensure!(buckets.next_cursor.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overdue_is_derived_when_the_day_passes(engine: Engine) -> Result<(), eyre::Report> {
    let alice = staff("recAlice");
    let task_id = engine
        .create(CreateTaskRequest::new("Book training").with_due_date("2026-03-10"))
        .await;
    let first = engine.service.list_tasks_for_actor(&alice, None, None).await?;
    let task = engine.service.find_task(&task_id).await?;
    eyre::ensure!(first.bucket_of(&task) == Some(StatusBucket::Upcoming));

    engine.clock.advance(TimeDelta::days(1));
    let next_day = engine.service.list_tasks_for_actor(&alice, None, None).await?;
    eyre::ensure!(next_day.bucket_of(&task) == Some(StatusBucket::Overdue));

    let stored = engine
        .repository
        .find("Tasks", task_id.as_str())
        .await?
        .ok_or_else(|| eyre::eyre!("task record missing"))?;
    eyre::ensure!(
        stored.fields.get("Status") == Some(&json!("In Progress")),
        "overdue must never be written"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pages_follow_the_cursor(engine: Engine) -> Result<(), eyre::Report> {
    let alice = staff("recAlice");
    let mut created: Vec<TaskId> = Vec::new();
    for day in 11..16 {
        created.push(
            engine
                .create(
                    CreateTaskRequest::new(format!("Step {day}"))
                        .with_due_date(format!("2026-03-{day}")),
                )
                .await,
        );
    }

    let mut seen = Vec::new();
    let mut cursor: Option<PageCursor> = None;
    let mut pages = 0;
    loop {
        let page = engine
            .service
            .list_tasks_for_actor(&alice, Some(2), cursor.clone())
            .await?;
        pages += 1;
        eyre::ensure!(page.len() <= 2);
        seen.extend(page.upcoming.iter().map(|task| task.id().clone()));
        cursor = page.next_cursor.map(PageCursor::new);
        if cursor.is_none() {
            break;
        }
        eyre::ensure!(pages < 10, "pagination did not terminate");
    }

    eyre::ensure!(pages == 3);
    eyre::ensure!(seen == created, "due date order should match creation order");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn page_size_is_clamped(engine: Engine) -> Result<(), eyre::Report> {
    for index in 0..3 {
        engine.open_task(&format!("Form {index}")).await;
    }
    let alice = staff("recAlice");
    let single = engine
        .service
        .list_tasks_for_actor(&alice, Some(0), None)
        .await?;
    eyre::ensure!(single.len() == 1);
    eyre::ensure!(single.next_cursor.is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cached_listing_is_invalidated_by_writes() -> Result<(), eyre::Report> {
    let engine = Engine::with_cache(TaskListCache::new(Duration::from_secs(30), 16));
    let alice = staff("recAlice");
    engine.open_task("Pick desk").await;
    let first = engine.service.list_tasks_for_actor(&alice, None, None).await?;
    eyre::ensure!(first.len() == 1);

    // A write that bypasses the service is not seen until the entry expires.
    engine
        .repository
        .delete("Tasks", first.upcoming.first().map_or("", |t| t.id().as_str()))
        .await?;
    let cached = engine.service.list_tasks_for_actor(&alice, None, None).await?;
    eyre::ensure!(cached == first, "listing should come from the cache");

    engine.clock.advance(TimeDelta::seconds(31));
    let expired = engine.service.list_tasks_for_actor(&alice, None, None).await?;
    eyre::ensure!(expired.is_empty());

    engine.open_task("Pick chair").await;
    let refreshed = engine.service.list_tasks_for_actor(&alice, None, None).await?;
    eyre::ensure!(refreshed.len() == 1, "service writes invalidate the cache");
    Ok(())
}
