use async_trait::async_trait;

use crate::application::services::JobManagerError;
use crate::domain::{Job, JobId};

/// Read-only view of job state consumed by pollers.
#[async_trait]
pub trait JobStatusReader: Send + Sync {
    async fn job_status(&self, id: JobId) -> Result<Job, JobManagerError>;
}
