use std::sync::Arc;

use crate::application::ports::{ProviderError, ResearchProvider};
use crate::application::services::{JobManager, JobManagerError, UsageTracker};
use crate::domain::{Job, JobId, JobStatus, ResearchRequest, ResearchResult};

/// Runs provider calls and drives a job from `queued` to a terminal state.
pub struct ResearchExecutor<P>
where
    P: ResearchProvider,
{
    provider: Arc<P>,
    job_manager: Arc<JobManager>,
    usage_tracker: Arc<UsageTracker>,
}

impl<P> ResearchExecutor<P>
where
    P: ResearchProvider,
{
    pub fn new(
        provider: Arc<P>,
        job_manager: Arc<JobManager>,
        usage_tracker: Arc<UsageTracker>,
    ) -> Self {
        Self {
            provider,
            job_manager,
            usage_tracker,
        }
    }

    pub async fn call_provider(
        &self,
        request: &ResearchRequest,
    ) -> Result<ResearchResult, ProviderError> {
        let messages = request.to_messages();
        let result = self.provider.query(&messages, &request.options).await?;
        self.usage_tracker.record(&result);
        tracing::debug!(
            provider = self.provider.name(),
            model = %result.model,
            citations = result.citations.len(),
            "Provider call succeeded"
        );
        Ok(result)
    }

    /// Provider errors end up on the job, except a 429 which leaves the job
    /// `processing` so the caller can retry once the provider admits again.
    /// Only job bookkeeping errors are returned.
    pub async fn execute(&self, job_id: JobId) -> Result<ExecutionOutcome, JobManagerError> {
        let job = self.begin(job_id).await?;

        match self.call_provider(&job.data).await {
            Ok(result) => {
                self.job_manager.complete_job(job_id, result).await?;
                tracing::info!(job_id = %job_id, "Research job completed");
                Ok(ExecutionOutcome::Finished(JobStatus::Completed))
            }
            Err(e) if e.is_rate_limited() => {
                tracing::warn!(job_id = %job_id, error = %e, "Provider rate limited research job");
                Ok(ExecutionOutcome::RateLimited)
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Research job failed");
                self.job_manager.fail_job(job_id, e.to_string()).await?;
                Ok(ExecutionOutcome::Finished(JobStatus::Failed))
            }
        }
    }

    /// Fails a job left `processing` by a rate-limited attempt.
    pub async fn give_up(&self, job_id: JobId, reason: &str) -> Result<(), JobManagerError> {
        tracing::warn!(job_id = %job_id, reason, "Giving up on research job");
        self.job_manager.fail_job(job_id, reason).await?;
        Ok(())
    }

    /// Queued jobs are started; a job already `processing` is resumed as is.
    async fn begin(&self, job_id: JobId) -> Result<Job, JobManagerError> {
        let job = self.job_manager.get_job_status(job_id).await?;
        if job.status == JobStatus::Processing {
            return Ok(job);
        }
        self.job_manager.start_job(job_id).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Finished(JobStatus),
    /// The provider answered 429; the job is still `processing`.
    RateLimited,
}
