use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;

use crate::application::ports::{Clock, JobRepository, JobStatusReader, RepositoryError};
use crate::domain::{
    DEFAULT_MIN_QUERY_LENGTH, Job, JobId, JobStatus, JobTransitionError, JobUpdate,
    PROGRESS_STARTED, RequestValidationError, ResearchRequest, ResearchResult,
};

/// Registry of research jobs and the only path through which they change.
pub struct JobManager {
    repository: Arc<dyn JobRepository>,
    clock: Arc<dyn Clock>,
    min_query_length: usize,
}

impl JobManager {
    pub fn new(repository: Arc<dyn JobRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            min_query_length: DEFAULT_MIN_QUERY_LENGTH,
        }
    }

    pub fn with_min_query_length(mut self, min_query_length: usize) -> Self {
        self.min_query_length = min_query_length;
        self
    }

    pub async fn create_job(&self, data: ResearchRequest) -> Result<Job, JobManagerError> {
        data.validate(self.min_query_length)?;

        let job = Job::new(data, self.clock.now());
        self.repository
            .create(&job)
            .await
            .map_err(|e| JobManagerError::from_repository(e, job.id))?;

        tracing::debug!(job_id = %job.id, deep = job.data.options.deep, "Job created");
        Ok(job)
    }

    pub async fn update_job_status(
        &self,
        id: JobId,
        status: JobStatus,
        update: JobUpdate,
    ) -> Result<Job, JobManagerError> {
        let job = self
            .repository
            .update_status(id, status, update, self.clock.now())
            .await
            .map_err(|e| JobManagerError::from_repository(e, id))?;

        tracing::debug!(job_id = %id, status = %status, progress = job.progress, "Job status transition");
        Ok(job)
    }

    pub async fn get_job_status(&self, id: JobId) -> Result<Job, JobManagerError> {
        self.repository
            .get_by_id(id)
            .await
            .map_err(|e| JobManagerError::from_repository(e, id))?
            .ok_or(JobManagerError::NotFound(id))
    }

    pub async fn start_job(&self, id: JobId) -> Result<Job, JobManagerError> {
        self.update_job_status(id, JobStatus::Processing, JobUpdate::progress(PROGRESS_STARTED))
            .await
    }

    pub async fn complete_job(
        &self,
        id: JobId,
        result: ResearchResult,
    ) -> Result<Job, JobManagerError> {
        self.update_job_status(id, JobStatus::Completed, JobUpdate::completed(result))
            .await
    }

    pub async fn fail_job(
        &self,
        id: JobId,
        error: impl Into<String>,
    ) -> Result<Job, JobManagerError> {
        self.update_job_status(id, JobStatus::Failed, JobUpdate::failed(error))
            .await
    }

    pub async fn delete_job(&self, id: JobId) -> Result<(), JobManagerError> {
        let removed = self
            .repository
            .delete(id)
            .await
            .map_err(|e| JobManagerError::from_repository(e, id))?;
        if !removed {
            return Err(JobManagerError::NotFound(id));
        }
        tracing::debug!(job_id = %id, "Job deleted");
        Ok(())
    }

    pub async fn job_count(&self) -> Result<usize, JobManagerError> {
        self.repository
            .count()
            .await
            .map_err(JobManagerError::Repository)
    }

    pub async fn list_jobs(&self, status: JobStatus) -> Result<Vec<Job>, JobManagerError> {
        self.repository
            .list_by_status(status)
            .await
            .map_err(JobManagerError::Repository)
    }

    /// Drops terminal jobs that finished more than `retention` ago.
    pub async fn evict_expired(&self, retention: TimeDelta) -> Result<usize, JobManagerError> {
        let cutoff = self.clock.now() - retention;
        let evicted = self
            .repository
            .evict_terminal_before(cutoff)
            .await
            .map_err(JobManagerError::Repository)?;
        if evicted > 0 {
            tracing::info!(evicted, "Evicted expired jobs");
        }
        Ok(evicted)
    }
}

#[async_trait]
impl JobStatusReader for JobManager {
    async fn job_status(&self, id: JobId) -> Result<Job, JobManagerError> {
        self.get_job_status(id).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobManagerError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("{0}")]
    InvalidTransition(JobTransitionError),
    #[error("job capacity reached: {0}")]
    Capacity(String),
    #[error("repository: {0}")]
    Repository(RepositoryError),
}

impl JobManagerError {
    fn from_repository(error: RepositoryError, id: JobId) -> Self {
        match error {
            RepositoryError::NotFound(_) => JobManagerError::NotFound(id),
            RepositoryError::Transition(e @ JobTransitionError::InvalidTransition { .. }) => {
                JobManagerError::InvalidTransition(e)
            }
            RepositoryError::Transition(e) => JobManagerError::Validation(e.to_string()),
            RepositoryError::CapacityExceeded(msg) => JobManagerError::Capacity(msg),
            other => JobManagerError::Repository(other),
        }
    }
}

impl From<RequestValidationError> for JobManagerError {
    fn from(error: RequestValidationError) -> Self {
        JobManagerError::Validation(error.to_string())
    }
}
