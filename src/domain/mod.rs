mod job;
mod job_id;
mod job_status;
mod message_role;
mod provider_message;
mod rate_limit_window;
mod research_request;
mod research_result;

pub use job::{Job, JobTransitionError, JobUpdate, PROGRESS_DONE, PROGRESS_STARTED};
pub use job_id::JobId;
pub use job_status::JobStatus;
pub use message_role::MessageRole;
pub use provider_message::ProviderMessage;
pub use rate_limit_window::RateLimitWindow;
pub use research_request::{
    DEFAULT_MIN_QUERY_LENGTH, RequestValidationError, ResearchOptions, ResearchRequest,
};
pub use research_result::{ResearchResult, TokenUsage};
