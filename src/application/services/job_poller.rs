use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::JobStatusReader;
use crate::application::services::JobManagerError;
use crate::domain::{JobId, JobStatus, ResearchResult};

/// Turns a job's eventual terminal state into a single outcome.
pub struct JobPoller {
    reader: Arc<dyn JobStatusReader>,
}

impl JobPoller {
    pub fn new(reader: Arc<dyn JobStatusReader>) -> Self {
        Self { reader }
    }

    /// Checks the job at most `max_attempts` times, sleeping `interval` between checks.
    ///
    /// An unknown id counts as "not visible yet" and consumes an attempt.
    pub async fn poll_job_status(
        &self,
        job_id: JobId,
        max_attempts: u32,
        interval: Duration,
    ) -> Result<ResearchResult, PollError> {
        for attempt in 1..=max_attempts {
            match self.reader.job_status(job_id).await {
                Ok(job) => match job.status {
                    JobStatus::Completed => {
                        return job.result.ok_or(PollError::MissingResult(job_id));
                    }
                    JobStatus::Failed => {
                        return Err(PollError::JobFailed(
                            job.error.unwrap_or_else(|| "unknown error".to_string()),
                        ));
                    }
                    JobStatus::Queued | JobStatus::Processing => {
                        tracing::trace!(job_id = %job_id, attempt, status = %job.status, "Job still running");
                    }
                },
                Err(JobManagerError::NotFound(_)) => {
                    tracing::trace!(job_id = %job_id, attempt, "Job not visible yet");
                }
                Err(e) => return Err(PollError::Status(e)),
            }

            if attempt < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }

        Err(PollError::Timeout {
            attempts: max_attempts,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("job failed: {0}")]
    JobFailed(String),
    #[error("job still running after {attempts} attempts")]
    Timeout { attempts: u32 },
    #[error("completed job {0} has no result")]
    MissingResult(JobId),
    #[error("status lookup: {0}")]
    Status(JobManagerError),
}
