use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{ProviderMessage, ResearchOptions, ResearchResult};

#[async_trait]
pub trait ResearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn query(
        &self,
        messages: &[ProviderMessage],
        options: &ResearchOptions,
    ) -> Result<ResearchResult, ProviderError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("rate limited by provider")]
    RateLimited { data: Option<Value> },
    #[error("api request failed: {message}")]
    Api {
        status: Option<u16>,
        message: String,
        data: Option<Value>,
    },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("provider configuration: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// True when the vendor itself rejected the call for rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. } => true,
            ProviderError::Api { status, .. } => *status == Some(429),
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::RateLimited { .. } => Some(429),
            ProviderError::Api { status, .. } => *status,
            _ => None,
        }
    }
}
