use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{ProviderError, ResearchProvider};
use crate::domain::{ProviderMessage, ResearchOptions, ResearchResult};

/// Scripted provider. Queued outcomes are returned in order, then the default answer.
pub struct MockResearchProvider {
    scripted: Mutex<VecDeque<Result<ResearchResult, ProviderError>>>,
    default_result: ResearchResult,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockResearchProvider {
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            default_result: ResearchResult::new("Mock answer", Vec::new(), "mock-model"),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_default_result(mut self, result: ResearchResult) -> Self {
        self.default_result = result;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push_result(&self, result: ResearchResult) {
        self.scripted().push_back(Ok(result));
    }

    pub fn push_error(&self, error: ProviderError) {
        self.scripted().push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn scripted(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<Result<ResearchResult, ProviderError>>> {
        self.scripted.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockResearchProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResearchProvider for MockResearchProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn query(
        &self,
        _messages: &[ProviderMessage],
        _options: &ResearchOptions,
    ) -> Result<ResearchResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.scripted().pop_front();
        next.unwrap_or_else(|| Ok(self.default_result.clone()))
    }
}
