//! Concurrent claim tests: only one of several simultaneous claims may win.

use super::helpers::{Engine, STAFF, engine, staff};
use async_trait::async_trait;
use hireflow::task::{
    adapters::memory::{
        InMemoryAuditRecorder, InMemoryNotificationOutbox, InMemoryRecordRepository,
    },
    domain::{StaffId, TaskId, TaskStatus},
    ports::{
        Record, RecordFields, RecordFilter, RecordPage, RecordQuery, RecordRepository,
        RecordRepositoryResult,
    },
    services::{
        ClaimGuard, ConflictReason, CreateTaskRequest, EngineSettings, TaskLifecycleError,
        TaskLifecycleService,
    },
};
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Barrier, Notify};

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exactly_one_concurrent_claim_wins(engine: Engine) -> Result<(), eyre::Report> {
    let task_id = engine.open_task("Set up payroll").await;

    let claims = STAFF.iter().map(|(id, _, _)| {
        let service = Arc::clone(&engine.service);
        let task = task_id.clone();
        let actor = staff(id);
        tokio::spawn(async move { service.claim_task(&task, &actor).await })
    });
    let mut winners = Vec::new();
    let mut conflicts = 0_usize;
    for handle in claims.collect::<Vec<_>>() {
        match handle.await? {
            Ok(task) => winners.push(task),
            Err(TaskLifecycleError::Conflict(ConflictReason::AlreadyClaimed)) => conflicts += 1,
            Err(other) => eyre::bail!("unexpected claim error: {other}"),
        }
    }

    eyre::ensure!(winners.len() == 1, "expected one winner, got {}", winners.len());
    eyre::ensure!(conflicts == STAFF.len() - 1);
    let winner = winners
        .first()
        .and_then(|task| task.assignee().cloned())
        .ok_or_else(|| eyre::eyre!("winner has no assignee"))?;
    let stored = engine.service.find_task(&task_id).await?;
    eyre::ensure!(stored.assignee() == Some(&winner), "stored owner differs from winner");
    Ok(())
}

/// Holds the first `parties` task reads until all of them have arrived, so
/// every claimant observes the task before anyone writes.
struct InterleavingRepository {
    inner: InMemoryRecordRepository,
    barrier: Barrier,
    parties: usize,
    arrived: AtomicUsize,
}

impl InterleavingRepository {
    fn new(inner: InMemoryRecordRepository, parties: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties),
            parties,
            arrived: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RecordRepository for InterleavingRepository {
    async fn find(&self, table: &str, id: &str) -> RecordRepositoryResult<Option<Record>> {
        let found = self.inner.find(table, id).await?;
        if table == "Tasks" && self.arrived.fetch_add(1, Ordering::SeqCst) < self.parties {
            self.barrier.wait().await;
        }
        Ok(found)
    }

    async fn query(&self, table: &str, query: &RecordQuery) -> RecordRepositoryResult<RecordPage> {
        self.inner.query(table, query).await
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        fields: RecordFields,
    ) -> RecordRepositoryResult<Record> {
        self.inner.update(table, id, fields).await
    }

    async fn create(&self, table: &str, fields: RecordFields) -> RecordRepositoryResult<Record> {
        self.inner.create(table, fields).await
    }

    async fn delete(&self, table: &str, id: &str) -> RecordRepositoryResult<()> {
        self.inner.delete(table, id).await
    }

    async fn update_if(
        &self,
        table: &str,
        id: &str,
        precondition: &RecordFilter,
        fields: RecordFields,
    ) -> RecordRepositoryResult<Record> {
        self.inner.update_if(table, id, precondition, fields).await
    }
}

type InterleavedService = TaskLifecycleService<
    InterleavingRepository,
    InMemoryAuditRecorder,
    InMemoryNotificationOutbox,
    DefaultClock,
>;

async fn interleaved_claims(guard: ClaimGuard) -> eyre::Result<(usize, usize)> {
    let inner = InMemoryRecordRepository::new();
    for (id, name, is_admin) in STAFF {
        inner.seed("Staff", super::helpers::staff_record(id, name, is_admin))?;
    }
    let service: Arc<InterleavedService> = Arc::new(
        TaskLifecycleService::new(
            Arc::new(InterleavingRepository::new(inner, 2)),
            Arc::new(InMemoryAuditRecorder::new()),
            Arc::new(InMemoryNotificationOutbox::new()),
            Arc::new(DefaultClock),
        )
        .with_settings(EngineSettings {
            claim_guard: guard,
            ..EngineSettings::default()
        }),
    );
    let task_id: TaskId = service
        .create_task(CreateTaskRequest::new("Order uniform"))
        .await?
        .id()
        .clone();

    let spawn_claim = |actor: &str| {
        let claimant = Arc::clone(&service);
        let task = task_id.clone();
        let who = staff(actor);
        tokio::spawn(async move { claimant.claim_task(&task, &who).await })
    };
    let first = spawn_claim("recAlice");
    let second = spawn_claim("recBob");
    let outcomes = [first.await?, second.await?];
    let wins = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|outcome| {
            matches!(
                outcome,
                Err(TaskLifecycleError::Conflict(ConflictReason::AlreadyClaimed))
            )
        })
        .count();
    Ok((wins, conflicts))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn conditional_write_rejects_the_interleaved_loser() -> Result<(), eyre::Report> {
    let (wins, conflicts) = interleaved_claims(ClaimGuard::ConditionalWrite).await?;
    eyre::ensure!(wins == 1 && conflicts == 1, "wins {wins}, conflicts {conflicts}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn read_verify_write_lets_both_interleaved_claims_through() -> Result<(), eyre::Report> {
    let (wins, conflicts) = interleaved_claims(ClaimGuard::ReadVerifyWrite).await?;
    eyre::ensure!(wins == 2 && conflicts == 0, "wins {wins}, conflicts {conflicts}");
    Ok(())
}

/// Parks the first task read once it has returned, until the test releases
/// it, so another operation can land between a claim's read and its write.
struct GatedRepository {
    inner: InMemoryRecordRepository,
    armed: AtomicBool,
    parked: Notify,
    release: Notify,
}

impl GatedRepository {
    fn new(inner: InMemoryRecordRepository) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(true),
            parked: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl RecordRepository for GatedRepository {
    async fn find(&self, table: &str, id: &str) -> RecordRepositoryResult<Option<Record>> {
        let found = self.inner.find(table, id).await?;
        if table == "Tasks" && self.armed.swap(false, Ordering::SeqCst) {
            self.parked.notify_one();
            self.release.notified().await;
        }
        Ok(found)
    }

    async fn query(&self, table: &str, query: &RecordQuery) -> RecordRepositoryResult<RecordPage> {
        self.inner.query(table, query).await
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        fields: RecordFields,
    ) -> RecordRepositoryResult<Record> {
        self.inner.update(table, id, fields).await
    }

    async fn create(&self, table: &str, fields: RecordFields) -> RecordRepositoryResult<Record> {
        self.inner.create(table, fields).await
    }

    async fn delete(&self, table: &str, id: &str) -> RecordRepositoryResult<()> {
        self.inner.delete(table, id).await
    }

    async fn update_if(
        &self,
        table: &str,
        id: &str,
        precondition: &RecordFilter,
        fields: RecordFields,
    ) -> RecordRepositoryResult<Record> {
        self.inner.update_if(table, id, precondition, fields).await
    }
}

/// Write that lands while a claim is parked between its read and its write.
#[derive(Debug, Clone, Copy)]
enum Intervening {
    Completion,
    Flag,
    RivalClaim,
}

#[rstest]
#[case(Intervening::Completion, ConflictReason::NotClaimable, TaskStatus::Completed, None)]
#[case(Intervening::Flag, ConflictReason::NotClaimable, TaskStatus::Flagged, None)]
#[case(
    Intervening::RivalClaim,
    ConflictReason::AlreadyClaimed,
    TaskStatus::InProgress,
    Some("recBob")
)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn claim_loses_to_a_write_between_its_read_and_write(
    #[case] intervening: Intervening,
    #[case] expected: ConflictReason,
    #[case] status: TaskStatus,
    #[case] owner: Option<&'static str>,
) -> Result<(), eyre::Report> {
    let inner = InMemoryRecordRepository::new();
    for (id, name, is_admin) in STAFF {
        inner.seed("Staff", super::helpers::staff_record(id, name, is_admin))?;
    }
    let repository = Arc::new(GatedRepository::new(inner));
    let service = Arc::new(TaskLifecycleService::new(
        Arc::clone(&repository),
        Arc::new(InMemoryAuditRecorder::new()),
        Arc::new(InMemoryNotificationOutbox::new()),
        Arc::new(DefaultClock),
    ));
    let task_id = service
        .create_task(CreateTaskRequest::new("Return laptop"))
        .await?
        .id()
        .clone();

    let claim = {
        let claimant = Arc::clone(&service);
        let task = task_id.clone();
        tokio::spawn(async move { claimant.claim_task(&task, &staff("recAlice")).await })
    };
    repository.parked.notified().await;
    let bob = staff("recBob");
    let landed = match intervening {
        Intervening::Completion => service.complete_task(&task_id, &bob).await?,
        Intervening::Flag => {
            service
                .flag_task(&task_id, &bob, "Courier has not collected it")
                .await?
        }
        Intervening::RivalClaim => service.claim_task(&task_id, &bob).await?,
    };
    eyre::ensure!(landed.status() == status, "intervening write left {:?}", landed.status());
    repository.release.notify_one();

    match claim.await? {
        Err(TaskLifecycleError::Conflict(reason)) if reason == expected => {}
        other => eyre::bail!("expected {expected:?}, got {other:?}"),
    }
    let stored = service.find_task(&task_id).await?;
    eyre::ensure!(stored.status() == status, "stored status {:?}", stored.status());
    eyre::ensure!(
        stored.assignee().map(StaffId::as_str) == owner,
        "stored assignee {:?}",
        stored.assignee()
    );
    eyre::ensure!(stored.claimed_at().is_some() == owner.is_some());
    Ok(())
}
