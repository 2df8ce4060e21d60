use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use research_relay::application::ports::{JobRepository, RepositoryError};
use research_relay::domain::{
    Job, JobId, JobStatus, JobUpdate, ResearchOptions, ResearchRequest, ResearchResult,
};
use research_relay::infrastructure::persistence::InMemoryJobRepository;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap()
}

fn new_job(at: DateTime<Utc>) -> Job {
    Job::new(
        ResearchRequest::new("tidal energy economics", ResearchOptions::deep()),
        at,
    )
}

async fn finish(repo: &InMemoryJobRepository, id: JobId, at: DateTime<Utc>) {
    repo.update_status(id, JobStatus::Processing, JobUpdate::progress(10), at)
        .await
        .unwrap();
    repo.update_status(
        id,
        JobStatus::Completed,
        JobUpdate::completed(ResearchResult::new("done", vec![], "sonar")),
        at,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn given_created_job_when_fetching_then_returns_equal_copy() {
    let repo = InMemoryJobRepository::new();
    let job = new_job(t0());

    repo.create(&job).await.unwrap();

    assert_eq!(repo.get_by_id(job.id).await.unwrap(), Some(job));
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn given_duplicate_id_when_creating_then_constraint_violation() {
    let repo = InMemoryJobRepository::new();
    let job = new_job(t0());
    repo.create(&job).await.unwrap();

    let result = repo.create(&job).await;

    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
}

#[tokio::test]
async fn given_missing_job_when_updating_then_not_found() {
    let repo = InMemoryJobRepository::new();

    let result = repo
        .update_status(JobId::new(), JobStatus::Processing, JobUpdate::default(), t0())
        .await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    assert_eq!(repo.get_by_id(JobId::new()).await.unwrap(), None);
}

#[tokio::test]
async fn given_illegal_transition_when_updating_then_stored_job_unchanged() {
    let repo = InMemoryJobRepository::new();
    let job = new_job(t0());
    repo.create(&job).await.unwrap();

    let result = repo
        .update_status(
            job.id,
            JobStatus::Completed,
            JobUpdate::completed(ResearchResult::new("x", vec![], "sonar")),
            t0(),
        )
        .await;

    assert!(matches!(result, Err(RepositoryError::Transition(_))));
    assert_eq!(repo.get_by_id(job.id).await.unwrap(), Some(job));
}

#[tokio::test]
async fn given_jobs_when_deleting_then_reports_whether_removed() {
    let repo = InMemoryJobRepository::new();
    let job = new_job(t0());
    repo.create(&job).await.unwrap();

    assert!(repo.delete(job.id).await.unwrap());
    assert!(!repo.delete(job.id).await.unwrap());
}

#[tokio::test]
async fn given_jobs_when_listing_by_status_then_sorted_by_creation_time() {
    let repo = InMemoryJobRepository::new();
    let later = new_job(t0() + TimeDelta::seconds(5));
    let earlier = new_job(t0());
    repo.create(&later).await.unwrap();
    repo.create(&earlier).await.unwrap();

    let queued = repo.list_by_status(JobStatus::Queued).await.unwrap();

    let ids: Vec<JobId> = queued.iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![earlier.id, later.id]);
    assert!(repo.list_by_status(JobStatus::Failed).await.unwrap().is_empty());
}

#[tokio::test]
async fn given_finished_jobs_when_evicting_before_cutoff_then_only_older_ones_removed() {
    let repo = InMemoryJobRepository::new();
    let old = new_job(t0());
    let recent = new_job(t0());
    let running = new_job(t0());
    for job in [&old, &recent, &running] {
        repo.create(job).await.unwrap();
    }
    finish(&repo, old.id, t0()).await;
    finish(&repo, recent.id, t0() + TimeDelta::minutes(30)).await;

    let evicted = repo
        .evict_terminal_before(t0() + TimeDelta::minutes(10))
        .await
        .unwrap();

    assert_eq!(evicted, 1);
    assert!(repo.get_by_id(old.id).await.unwrap().is_none());
    assert!(repo.get_by_id(recent.id).await.unwrap().is_some());
    assert!(repo.get_by_id(running.id).await.unwrap().is_some());
}

#[tokio::test]
async fn given_full_store_when_creating_then_oldest_finished_job_is_dropped() {
    let repo = InMemoryJobRepository::new().with_max_jobs(2);
    let first = new_job(t0());
    let second = new_job(t0());
    repo.create(&first).await.unwrap();
    repo.create(&second).await.unwrap();
    finish(&repo, second.id, t0()).await;
    finish(&repo, first.id, t0() + TimeDelta::seconds(1)).await;

    let third = new_job(t0());
    repo.create(&third).await.unwrap();

    assert_eq!(repo.count().await.unwrap(), 2);
    assert!(repo.get_by_id(second.id).await.unwrap().is_none());
    assert!(repo.get_by_id(first.id).await.unwrap().is_some());
}

#[tokio::test]
async fn given_full_store_of_running_jobs_when_creating_then_capacity_exceeded() {
    let repo = InMemoryJobRepository::new().with_max_jobs(1);
    repo.create(&new_job(t0())).await.unwrap();

    let result = repo.create(&new_job(t0())).await;

    assert!(matches!(result, Err(RepositoryError::CapacityExceeded(_))));
}
