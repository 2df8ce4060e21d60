use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::Instrument;

use crate::application::ports::{Clock, ProviderError, ResearchProvider};
use crate::application::services::{
    DeferredResearch, ExecutionOutcome, JobManager, JobManagerError, RateLimitError, RateLimiter,
    ResearchExecutor,
};
use crate::domain::{
    DEFAULT_MIN_QUERY_LENGTH, JobId, RequestValidationError, ResearchOptions, ResearchRequest,
    ResearchResult,
};
use crate::infrastructure::observability::sanitize_prompt;

pub const QUEUE_UNAVAILABLE: &str = "research queue unavailable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Rate limiter key guarding the provider.
    pub provider_key: String,
    pub min_query_length: usize,
    /// Expected run time of a long-running request once admitted.
    pub deep_estimate: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            provider_key: "perplexity".to_string(),
            min_query_length: DEFAULT_MIN_QUERY_LENGTH,
            deep_estimate: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Sync {
        result: ResearchResult,
    },
    Async {
        job_id: JobId,
        estimated_time: Duration,
    },
}

pub struct ResearchOrchestrator<P>
where
    P: ResearchProvider,
{
    executor: Arc<ResearchExecutor<P>>,
    job_manager: Arc<JobManager>,
    rate_limiter: Arc<RateLimiter>,
    deferred_sender: mpsc::Sender<DeferredResearch>,
    clock: Arc<dyn Clock>,
    config: OrchestratorConfig,
}

impl<P> ResearchOrchestrator<P>
where
    P: ResearchProvider + 'static,
{
    pub fn new(
        executor: Arc<ResearchExecutor<P>>,
        job_manager: Arc<JobManager>,
        rate_limiter: Arc<RateLimiter>,
        deferred_sender: mpsc::Sender<DeferredResearch>,
        clock: Arc<dyn Clock>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            executor,
            job_manager,
            rate_limiter,
            deferred_sender,
            clock,
            config,
        }
    }

    pub async fn submit(
        &self,
        query: &str,
        options: ResearchOptions,
    ) -> Result<SubmitOutcome, ResearchError> {
        self.submit_request(ResearchRequest::new(query, options))
            .await
    }

    #[tracing::instrument(skip(self, request), fields(deep = request.options.deep))]
    pub async fn submit_request(
        &self,
        request: ResearchRequest,
    ) -> Result<SubmitOutcome, ResearchError> {
        request.validate(self.config.min_query_length)?;
        tracing::debug!(query = %sanitize_prompt(&request.query), "Research request received");

        if !self.rate_limiter.track_request(&self.config.provider_key)? {
            tracing::info!(provider_key = %self.config.provider_key, "Provider saturated, deferring request");
            return self.defer(request).await;
        }

        if request.options.deep {
            return self.start_deep(request).await;
        }

        match self.executor.call_provider(&request).await {
            Ok(result) => Ok(SubmitOutcome::Sync { result }),
            Err(e) if e.is_rate_limited() => {
                tracing::warn!(error = %e, "Provider reported rate limiting, deferring request");
                self.defer(request).await
            }
            Err(e) => {
                tracing::error!(error = %e, "Provider call failed");
                Err(ResearchError::Provider(e))
            }
        }
    }

    async fn defer(&self, request: ResearchRequest) -> Result<SubmitOutcome, ResearchError> {
        let deep = request.options.deep;
        let job = self.job_manager.create_job(request).await?;
        let job_id = job.id;

        if let Err(e) = self.deferred_sender.try_send(DeferredResearch { job_id }) {
            tracing::error!(job_id = %job_id, error = %e, "Failed to enqueue deferred research");
            self.abandon(job_id).await?;
        }

        let info = self.rate_limiter.get_rate_limit_info(&self.config.provider_key)?;
        let until_reset = (info.reset_time - self.clock.now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        let run_time = if deep {
            self.config.deep_estimate
        } else {
            Duration::ZERO
        };

        Ok(SubmitOutcome::Async {
            job_id,
            estimated_time: until_reset + run_time,
        })
    }

    async fn start_deep(&self, request: ResearchRequest) -> Result<SubmitOutcome, ResearchError> {
        let job = self.job_manager.create_job(request).await?;
        let job_id = job.id;

        let executor = Arc::clone(&self.executor);
        let sender = self.deferred_sender.clone();
        let span = tracing::info_span!("deep_research", job_id = %job_id);
        tokio::spawn(
            async move {
                match executor.execute(job_id).await {
                    Ok(ExecutionOutcome::Finished(_)) => {}
                    Ok(ExecutionOutcome::RateLimited) => {
                        // The job stays `processing`; the worker resumes it once admitted.
                        if let Err(e) = sender.try_send(DeferredResearch { job_id }) {
                            tracing::error!(
                                error = %e,
                                "Failed to enqueue rate limited deep research"
                            );
                            if let Err(e) = executor.give_up(job_id, QUEUE_UNAVAILABLE).await {
                                tracing::error!(error = %e, "Deep research job bookkeeping failed");
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Deep research job bookkeeping failed");
                    }
                }
            }
            .instrument(span),
        );

        tracing::info!(job_id = %job_id, "Deep research job started");
        Ok(SubmitOutcome::Async {
            job_id,
            estimated_time: self.config.deep_estimate,
        })
    }

    /// Jobs can only fail from `processing`, so the job is started first.
    async fn abandon(&self, job_id: JobId) -> Result<(), JobManagerError> {
        self.job_manager.start_job(job_id).await?;
        self.job_manager.fail_job(job_id, QUEUE_UNAVAILABLE).await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("validation: {0}")]
    Validation(#[from] RequestValidationError),
    #[error("rate limit: {0}")]
    RateLimit(#[from] RateLimitError),
    #[error("provider: {0}")]
    Provider(#[from] ProviderError),
    #[error("job: {0}")]
    Job(#[from] JobManagerError),
}
