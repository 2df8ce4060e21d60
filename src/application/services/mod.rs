mod job_manager;
mod job_poller;
mod rate_limiter;
mod research_executor;
mod research_orchestrator;
mod research_worker;
mod usage_tracker;

pub use job_manager::{JobManager, JobManagerError};
pub use job_poller::{JobPoller, PollError};
pub use rate_limiter::{RateLimitError, RateLimitInfo, RateLimitRule, RateLimitStatus, RateLimiter};
pub use research_executor::{ExecutionOutcome, ResearchExecutor};
pub use research_orchestrator::{
    OrchestratorConfig, QUEUE_UNAVAILABLE, ResearchError, ResearchOrchestrator, SubmitOutcome,
};
pub use research_worker::{
    DEFAULT_VENDOR_RETRIES, DeferredResearch, ResearchWorker, ResearchWorkerError,
    VENDOR_RATE_LIMITED,
};
pub use usage_tracker::{ModelPricing, ModelUsage, UsageSnapshot, UsageTracker};
