use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::Instrument;

use crate::application::ports::{Clock, ResearchProvider};
use crate::application::services::{
    ExecutionOutcome, JobManagerError, RateLimitError, RateLimiter, ResearchExecutor,
};
use crate::domain::JobId;

const MIN_ADMISSION_WAIT: Duration = Duration::from_millis(50);
pub const DEFAULT_VENDOR_RETRIES: u32 = 3;
pub const VENDOR_RATE_LIMITED: &str = "provider kept rate limiting the request";

/// A job that was deferred because the provider was saturated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredResearch {
    pub job_id: JobId,
}

pub struct ResearchWorker<P>
where
    P: ResearchProvider,
{
    receiver: mpsc::Receiver<DeferredResearch>,
    executor: Arc<ResearchExecutor<P>>,
    rate_limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
    provider_key: String,
    max_recheck_interval: Duration,
    max_vendor_retries: u32,
}

impl<P> ResearchWorker<P>
where
    P: ResearchProvider + 'static,
{
    pub fn new(
        receiver: mpsc::Receiver<DeferredResearch>,
        executor: Arc<ResearchExecutor<P>>,
        rate_limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
        provider_key: String,
        max_recheck_interval: Duration,
    ) -> Self {
        Self {
            receiver,
            executor,
            rate_limiter,
            clock,
            provider_key,
            max_recheck_interval: max_recheck_interval.max(MIN_ADMISSION_WAIT),
            max_vendor_retries: DEFAULT_VENDOR_RETRIES,
        }
    }

    /// How many provider 429s a job survives before it is failed.
    pub fn with_max_vendor_retries(mut self, retries: u32) -> Self {
        self.max_vendor_retries = retries;
        self
    }

    pub async fn run(mut self) {
        tracing::info!(provider_key = %self.provider_key, "Research worker started");
        while let Some(msg) = self.receiver.recv().await {
            let span = tracing::info_span!("deferred_research", job_id = %msg.job_id);

            if let Err(e) = self.process_job(msg).instrument(span).await {
                tracing::error!(job_id = %msg.job_id, error = %e, "Deferred research job failed");
            }
        }
        tracing::info!("Research worker stopped: channel closed");
    }

    async fn process_job(&self, msg: DeferredResearch) -> Result<(), ResearchWorkerError> {
        let mut vendor_retries = 0;
        loop {
            self.wait_for_admission().await?;
            match self.executor.execute(msg.job_id).await? {
                ExecutionOutcome::Finished(status) => {
                    tracing::debug!(status = %status, "Deferred research job finished");
                    return Ok(());
                }
                ExecutionOutcome::RateLimited if vendor_retries < self.max_vendor_retries => {
                    vendor_retries += 1;
                    tracing::info!(
                        attempt = vendor_retries,
                        "Provider still rate limited, waiting for next window"
                    );
                    self.wait_for_window_end().await?;
                }
                ExecutionOutcome::RateLimited => {
                    self.executor
                        .give_up(msg.job_id, VENDOR_RATE_LIMITED)
                        .await?;
                    return Ok(());
                }
            }
        }
    }

    /// Sits out the rest of the current window even if it still has room locally.
    async fn wait_for_window_end(&self) -> Result<(), RateLimitError> {
        let reset_time = self
            .rate_limiter
            .get_rate_limit_info(&self.provider_key)?
            .reset_time;
        loop {
            let Ok(until_reset) = (reset_time - self.clock.now()).to_std() else {
                return Ok(());
            };
            if until_reset.is_zero() {
                return Ok(());
            }
            let wait = until_reset.clamp(MIN_ADMISSION_WAIT, self.max_recheck_interval);
            tokio::time::sleep(wait).await;
        }
    }

    async fn wait_for_admission(&self) -> Result<(), RateLimitError> {
        loop {
            if self.rate_limiter.track_request(&self.provider_key)? {
                return Ok(());
            }

            let status = self.rate_limiter.check_limit(&self.provider_key)?;
            let until_reset = status
                .reset_time
                .and_then(|reset| (reset - self.clock.now()).to_std().ok())
                .unwrap_or(Duration::ZERO);
            let wait = until_reset.clamp(MIN_ADMISSION_WAIT, self.max_recheck_interval);

            tracing::debug!(wait_ms = wait.as_millis() as u64, "Waiting for rate limit window");
            tokio::time::sleep(wait).await;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResearchWorkerError {
    #[error("rate limit: {0}")]
    RateLimit(#[from] RateLimitError),
    #[error("job: {0}")]
    Job(#[from] JobManagerError),
}
