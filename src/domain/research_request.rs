use super::ProviderMessage;

pub const DEFAULT_MIN_QUERY_LENGTH: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResearchOptions {
    /// Long-running request; always tracked through a job.
    pub deep: bool,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
}

impl ResearchOptions {
    pub fn deep() -> Self {
        Self {
            deep: true,
            ..Self::default()
        }
    }
}

/// Parameters of one research request. Immutable once attached to a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchRequest {
    pub query: String,
    pub options: ResearchOptions,
    pub session_id: Option<String>,
}

impl ResearchRequest {
    pub fn new(query: impl Into<String>, options: ResearchOptions) -> Self {
        Self {
            query: query.into(),
            options,
            session_id: None,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn validate(&self, min_query_length: usize) -> Result<(), RequestValidationError> {
        let trimmed = self.query.trim();
        if trimmed.is_empty() {
            return Err(RequestValidationError::EmptyQuery);
        }

        let actual = trimmed.chars().count();
        if actual < min_query_length {
            return Err(RequestValidationError::QueryTooShort {
                min: min_query_length,
                actual,
            });
        }

        Ok(())
    }

    pub fn to_messages(&self) -> Vec<ProviderMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(prompt) = self
            .options
            .system_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
        {
            messages.push(ProviderMessage::system(prompt));
        }
        messages.push(ProviderMessage::user(self.query.trim()));
        messages
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestValidationError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("query must be at least {min} characters, got {actual}")]
    QueryTooShort { min: usize, actual: usize },
}
