mod health;
mod job_status;
mod rate_limits;
mod research;
pub mod responses;
mod usage;

pub use health::health_handler;
pub use job_status::{
    delete_job_handler, job_status_handler, list_jobs_handler, wait_for_job_handler,
};
pub use rate_limits::rate_limit_handler;
pub use research::research_handler;
pub use usage::usage_handler;
