//! Record repository behaviour against a real `PostgreSQL` database.

use super::helpers::{TestDatabase, fields, insert, test_runtime};
use hireflow::task::ports::{
    PageCursor, RecordFilter, RecordQuery, RecordRepository, RecordRepositoryError, RecordSort,
};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use serde_json::{Value, json};

fn titles(records: &[hireflow::task::ports::Record]) -> Vec<String> {
    let mut titles: Vec<String> = records
        .iter()
        .filter_map(|record| record.fields.get("Task").and_then(Value::as_str))
        .map(str::to_owned)
        .collect();
    titles.sort();
    titles
}

#[rstest]
fn guarded_update_tells_a_failed_precondition_from_a_missing_record(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster, "guarded_update")?;
    let repository = database.repository(1)?;
    let rt = test_runtime()?;

    rt.block_on(async {
        let owned = insert(
            &repository,
            "Tasks",
            json!({ "Task": "Book induction", "Status": "In Progress", "Assigned To": ["recBob"] }),
        )
        .await?;
        let unclaimed = RecordFilter::link_empty("Assigned To");
        let patch = fields(json!({ "Assigned To": ["recAlice"] }))?;

        let refused = repository
            .update_if("Tasks", &owned.id, &unclaimed, patch.clone())
            .await;
        eyre::ensure!(
            matches!(refused, Err(RecordRepositoryError::PreconditionFailed { .. })),
            "expected a failed precondition, got {refused:?}"
        );
        let stored = repository
            .find("Tasks", &owned.id)
            .await?
            .ok_or_else(|| eyre::eyre!("task vanished"))?;
        eyre::ensure!(stored.fields.get("Assigned To") == Some(&json!(["recBob"])));

        let missing_id = uuid::Uuid::new_v4().to_string();
        for id in [missing_id.as_str(), "recNotAUuid"] {
            let missing = repository
                .update_if("Tasks", id, &unclaimed, patch.clone())
                .await;
            eyre::ensure!(
                matches!(missing, Err(RecordRepositoryError::NotFound { .. })),
                "expected not found for {id}, got {missing:?}"
            );
        }

        let other_table = repository
            .update_if("Staff", &owned.id, &unclaimed, patch)
            .await;
        eyre::ensure!(
            matches!(other_table, Err(RecordRepositoryError::NotFound { .. })),
            "records are scoped by table, got {other_table:?}"
        );
        Ok(())
    })
}

#[rstest]
fn link_filters_read_bare_and_list_values_alike(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster, "link_filters")?;
    let repository = database.repository(1)?;
    let rt = test_runtime()?;

    rt.block_on(async {
        let stored = [
            json!({ "Task": "list", "Assigned To": ["recAlice"] }),
            json!({ "Task": "bare", "Assigned To": "recAlice" }),
            json!({ "Task": "padded", "Assigned To": [" recAlice "] }),
            json!({ "Task": "second", "Assigned To": ["recBob", "recAlice"] }),
            json!({ "Task": "empty list", "Assigned To": [] }),
            json!({ "Task": "blank", "Assigned To": "" }),
            json!({ "Task": "null", "Assigned To": null }),
            json!({ "Task": "missing" }),
        ];
        for value in stored {
            insert(&repository, "Tasks", value).await?;
        }

        let owned = repository
            .query(
                "Tasks",
                &RecordQuery::new().with_filter(RecordFilter::link_is("Assigned To", "recAlice")),
            )
            .await?;
        eyre::ensure!(
            titles(&owned.records) == ["bare", "list", "padded"],
            "owned: {:?}",
            titles(&owned.records)
        );

        let unassigned = repository
            .query(
                "Tasks",
                &RecordQuery::new().with_filter(RecordFilter::link_empty("Assigned To")),
            )
            .await?;
        eyre::ensure!(
            titles(&unassigned.records) == ["blank", "empty list", "missing", "null"],
            "unassigned: {:?}",
            titles(&unassigned.records)
        );
        Ok(())
    })
}

#[rstest]
fn status_filters_match_exact_values_and_absence(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster, "status_filters")?;
    let repository = database.repository(1)?;
    let rt = test_runtime()?;

    rt.block_on(async {
        for value in [
            json!({ "Task": "open", "Status": "In Progress" }),
            json!({ "Task": "done", "Status": "Completed" }),
            json!({ "Task": "unlabelled" }),
            json!({ "Task": "null", "Status": null }),
        ] {
            insert(&repository, "Tasks", value).await?;
        }

        let query = |filter| RecordQuery::new().with_filter(filter);
        let open = repository
            .query("Tasks", &query(RecordFilter::equals("Status", "In Progress")))
            .await?;
        eyre::ensure!(titles(&open.records) == ["open"]);
        let not_done = repository
            .query("Tasks", &query(RecordFilter::not_equals("Status", "Completed")))
            .await?;
        eyre::ensure!(titles(&not_done.records) == ["null", "open", "unlabelled"]);
        let absent = repository
            .query("Tasks", &query(RecordFilter::absent("Status")))
            .await?;
        eyre::ensure!(titles(&absent.records) == ["null", "unlabelled"]);
        Ok(())
    })
}

#[rstest]
fn due_date_order_puts_undated_records_last_across_pages(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster, "due_date_order")?;
    let repository = database.repository(1)?;
    let rt = test_runtime()?;

    rt.block_on(async {
        for value in [
            json!({ "Task": "undated" }),
            json!({ "Task": "twelfth", "Due Date": "2026-03-12" }),
            json!({ "Task": "null date", "Due Date": null }),
            json!({ "Task": "tenth", "Due Date": "2026-03-10" }),
            json!({ "Task": "eleventh", "Due Date": "2026-03-11" }),
        ] {
            insert(&repository, "Tasks", value).await?;
        }

        let mut seen = Vec::new();
        let mut cursor: Option<PageCursor> = None;
        let mut pages = 0_usize;
        loop {
            let page = repository
                .query(
                    "Tasks",
                    &RecordQuery::new()
                        .sorted_by(RecordSort::ascending("Due Date"))
                        .with_page_size(2)
                        .with_cursor(cursor.take()),
                )
                .await?;
            pages += 1;
            seen.extend(
                page.records
                    .iter()
                    .filter_map(|record| record.fields.get("Task").and_then(Value::as_str))
                    .map(str::to_owned),
            );
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        eyre::ensure!(pages == 3, "expected three pages, got {pages}");
        eyre::ensure!(
            seen == ["tenth", "eleventh", "twelfth", "undated", "null date"],
            "order: {seen:?}"
        );

        let foreign = repository
            .query(
                "Tasks",
                &RecordQuery::new().with_cursor(Some(PageCursor::new("not-an-offset"))),
            )
            .await;
        eyre::ensure!(
            matches!(foreign, Err(RecordRepositoryError::InvalidCursor(_))),
            "expected an invalid cursor, got {foreign:?}"
        );
        Ok(())
    })
}

#[rstest]
fn updates_merge_fields_and_deletes_are_idempotent(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = TestDatabase::create(shared_test_cluster, "update_delete")?;
    let repository = database.repository(1)?;
    let rt = test_runtime()?;

    rt.block_on(async {
        let created = insert(
            &repository,
            "Tasks",
            json!({ "Task": "Order uniform", "Hiring Manager": "Dana" }),
        )
        .await?;
        let updated = repository
            .update("Tasks", &created.id, fields(json!({ "Status": "Flagged" }))?)
            .await?;
        eyre::ensure!(updated.fields.get("Hiring Manager") == Some(&json!("Dana")));
        eyre::ensure!(updated.fields.get("Status") == Some(&json!("Flagged")));

        repository.delete("Tasks", &created.id).await?;
        repository.delete("Tasks", &created.id).await?;
        repository.delete("Tasks", "recNotAUuid").await?;
        eyre::ensure!(repository.find("Tasks", &created.id).await?.is_none());
        Ok(())
    })
}
