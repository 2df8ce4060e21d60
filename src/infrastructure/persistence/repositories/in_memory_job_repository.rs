use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStatus, JobUpdate};

/// Process-lifetime job store. Jobs are lost on restart.
pub struct InMemoryJobRepository {
    jobs: Mutex<HashMap<JobId, Job>>,
    max_jobs: Option<usize>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            max_jobs: None,
        }
    }

    /// At capacity the oldest finished job makes room; running jobs are never dropped.
    pub fn with_max_jobs(mut self, max_jobs: usize) -> Self {
        self.max_jobs = Some(max_jobs.max(1));
        self
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryJobRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn evict_oldest_terminal(jobs: &mut HashMap<JobId, Job>) -> bool {
    let oldest = jobs
        .values()
        .filter(|job| job.is_terminal())
        .min_by_key(|job| job.completed_at.unwrap_or(job.updated_at))
        .map(|job| job.id);

    match oldest {
        Some(id) => {
            jobs.remove(&id);
            tracing::debug!(job_id = %id, "Evicted finished job to make room");
            true
        }
        None => false,
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        let mut jobs = self.lock();

        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "job {} already exists",
                job.id
            )));
        }

        if let Some(max_jobs) = self.max_jobs {
            while jobs.len() >= max_jobs {
                if !evict_oldest_terminal(&mut jobs) {
                    return Err(RepositoryError::CapacityExceeded(format!(
                        "{} jobs still running",
                        jobs.len()
                    )));
                }
            }
        }

        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.lock().get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        update: JobUpdate,
        now: DateTime<Utc>,
    ) -> Result<Job, RepositoryError> {
        let mut jobs = self.lock();
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        job.transition(status, update, now)?;
        Ok(job.clone())
    }

    async fn delete(&self, id: JobId) -> Result<bool, RepositoryError> {
        Ok(self.lock().remove(&id).is_some())
    }

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError> {
        let mut jobs: Vec<Job> = self
            .lock()
            .values()
            .filter(|job| job.status == status)
            .cloned()
            .collect();
        jobs.sort_by_key(|job| job.created_at);
        Ok(jobs)
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock().len())
    }

    async fn evict_terminal_before(&self, cutoff: DateTime<Utc>) -> Result<usize, RepositoryError> {
        let mut jobs = self.lock();
        let before = jobs.len();
        jobs.retain(|_, job| {
            !(job.is_terminal() && job.completed_at.is_some_and(|done| done < cutoff))
        });
        Ok(before - jobs.len())
    }
}
