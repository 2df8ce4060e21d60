use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Job, JobId, JobStatus, JobUpdate};

use super::RepositoryError;

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    /// Validates and applies the transition atomically, returning the updated job.
    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        update: JobUpdate,
        now: DateTime<Utc>,
    ) -> Result<Job, RepositoryError>;

    async fn delete(&self, id: JobId) -> Result<bool, RepositoryError>;

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;

    /// Removes terminal jobs that finished before `cutoff`.
    async fn evict_terminal_before(&self, cutoff: DateTime<Utc>) -> Result<usize, RepositoryError>;
}
