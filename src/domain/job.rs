use chrono::{DateTime, Utc};

use super::{JobId, JobStatus, ResearchRequest, ResearchResult};

pub const PROGRESS_STARTED: u8 = 10;
pub const PROGRESS_DONE: u8 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    pub data: ResearchRequest,
    pub result: Option<ResearchResult>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields merged into a job alongside a status transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub progress: Option<u8>,
    pub result: Option<ResearchResult>,
    pub error: Option<String>,
}

impl JobUpdate {
    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    pub fn completed(result: ResearchResult) -> Self {
        Self {
            progress: Some(PROGRESS_DONE),
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

impl Job {
    pub fn new(data: ResearchRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: JobId::new(),
            status: JobStatus::Queued,
            progress: 0,
            data,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Applies a transition. On error the job is left untouched.
    pub fn transition(
        &mut self,
        status: JobStatus,
        update: JobUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), JobTransitionError> {
        if !self.status.can_transition_to(status) {
            return Err(JobTransitionError::InvalidTransition {
                from: self.status,
                to: status,
            });
        }

        let JobUpdate {
            progress,
            result,
            error,
        } = update;

        match status {
            JobStatus::Completed if result.is_none() => {
                return Err(JobTransitionError::MissingResult);
            }
            JobStatus::Failed if error.as_deref().is_none_or(|e| e.trim().is_empty()) => {
                return Err(JobTransitionError::MissingError);
            }
            _ => {}
        }

        self.status = status;
        if let Some(progress) = progress {
            self.progress = progress.min(PROGRESS_DONE);
        }
        match status {
            JobStatus::Completed => {
                self.progress = PROGRESS_DONE;
                self.result = result;
                self.completed_at = Some(now);
            }
            JobStatus::Failed => {
                self.error = error;
                self.completed_at = Some(now);
            }
            JobStatus::Queued | JobStatus::Processing => {}
        }
        self.updated_at = now;

        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobTransitionError {
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
    #[error("completed jobs require a result")]
    MissingResult,
    #[error("failed jobs require an error message")]
    MissingError,
}
