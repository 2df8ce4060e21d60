use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::application::ports::{Clock, JobStatusReader, ResearchProvider};
use crate::application::services::{
    JobManager, JobPoller, RateLimiter, ResearchExecutor, ResearchOrchestrator, ResearchWorker,
    UsageTracker,
};
use crate::infrastructure::persistence::InMemoryJobRepository;
use crate::presentation::config::Settings;

pub struct AppState<P>
where
    P: ResearchProvider,
{
    pub orchestrator: Arc<ResearchOrchestrator<P>>,
    pub job_manager: Arc<JobManager>,
    pub job_poller: Arc<JobPoller>,
    pub rate_limiter: Arc<RateLimiter>,
    pub usage_tracker: Arc<UsageTracker>,
    pub settings: Settings,
}

impl<P> AppState<P>
where
    P: ResearchProvider + 'static,
{
    /// Wires the research workflow. The returned worker must be spawned to drain deferred jobs.
    pub fn build(
        provider: Arc<P>,
        settings: Settings,
        clock: Arc<dyn Clock>,
    ) -> (Self, ResearchWorker<P>) {
        let mut repository = InMemoryJobRepository::new();
        if let Some(max_jobs) = settings.jobs.max_jobs {
            repository = repository.with_max_jobs(max_jobs);
        }

        let job_manager = Arc::new(
            JobManager::new(Arc::new(repository), Arc::clone(&clock))
                .with_min_query_length(settings.research.min_query_length),
        );

        let mut rate_limiter =
            RateLimiter::new(settings.rate_limit.default_rule(), Arc::clone(&clock));
        for (key, rule) in settings.rate_limit.override_rules() {
            rate_limiter = rate_limiter.with_rule(key, rule);
        }
        if let Some(max_keys) = settings.rate_limit.max_keys {
            rate_limiter = rate_limiter.with_max_keys(max_keys);
        }
        let rate_limiter = Arc::new(rate_limiter);

        let usage_tracker = Arc::new(UsageTracker::new(settings.usage.pricing_table()));
        let executor = Arc::new(ResearchExecutor::new(
            provider,
            Arc::clone(&job_manager),
            Arc::clone(&usage_tracker),
        ));

        let (sender, receiver) = mpsc::channel(settings.research.queue_capacity.max(1));
        let orchestrator = Arc::new(ResearchOrchestrator::new(
            Arc::clone(&executor),
            Arc::clone(&job_manager),
            Arc::clone(&rate_limiter),
            sender,
            Arc::clone(&clock),
            settings.research.orchestrator_config(),
        ));
        let worker = ResearchWorker::new(
            receiver,
            executor,
            Arc::clone(&rate_limiter),
            clock,
            settings.research.provider_key.clone(),
            Duration::from_millis(settings.research.worker_recheck_ms),
        )
        .with_max_vendor_retries(settings.research.vendor_retries);

        let status_reader: Arc<dyn JobStatusReader> = job_manager.clone();
        let job_poller = Arc::new(JobPoller::new(status_reader));

        let state = Self {
            orchestrator,
            job_manager,
            job_poller,
            rate_limiter,
            usage_tracker,
            settings,
        };
        (state, worker)
    }
}

impl<P> Clone for AppState<P>
where
    P: ResearchProvider,
{
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            job_manager: Arc::clone(&self.job_manager),
            job_poller: Arc::clone(&self.job_poller),
            rate_limiter: Arc::clone(&self.rate_limiter),
            usage_tracker: Arc::clone(&self.usage_tracker),
            settings: self.settings.clone(),
        }
    }
}
